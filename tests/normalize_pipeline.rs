//! Normalize, filter, tag and count over realistic raw records.

use chrono::NaiveDate;

use jobmarket::models::{
    ExpireDate, JobDetail, ListingItem, RawJobRecord, SkillCategory, SkillCount,
};
use jobmarket::services::skills::NoopTranslator;
use jobmarket::services::{
    skill_counts, JobNormalizer, SkillExtractor, SkillVocabulary, TitleFilter,
};
use jobmarket::storage;

const RATE: f64 = 25505.0;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

struct Row<'a> {
    title: &'a str,
    salary: &'a str,
    experience: &'a str,
    expires: &'a str,
    requirements: &'a str,
}

fn raw(id: usize, row: Row<'_>) -> RawJobRecord {
    let mut detail = JobDetail::unavailable();
    detail.experience = row.experience.to_string();
    detail.requirements = row.requirements.to_string();
    detail.description = "Phân tích dữ liệu kinh doanh".to_string();
    ListingItem {
        title: row.title.to_string(),
        company: "công ty cổ phần abc".to_string(),
        location: "Hà Nội\nĐà Nẵng".to_string(),
        salary: row.salary.to_string(),
        posted: "05-03-2025".to_string(),
        expires: row.expires.to_string(),
        link: format!("https://careerviet.vn/vi/tim-viec-lam/job-{}.html", id),
        welfare: vec!["Laptop".to_string()],
    }
    .into_record(detail)
}

fn batch() -> Vec<RawJobRecord> {
    let rows = [
        Row {
            title: "data analyst",
            salary: "10 Tr - 20 Tr VND",
            experience: "1 - 3 Năm",
            expires: "Hôm nay",
            requirements: "Strong SQL and Excel. Power BI dashboards. Good communication.",
        },
        Row {
            title: "business analyst (phân tích)",
            salary: "20 Tr - 40 Tr VND",
            experience: "Trên 5 Năm",
            expires: "12 ngày",
            requirements: "SQL, Python and stakeholder management in banking projects.",
        },
        Row {
            title: "sales executive",
            salary: "Lên đến 30 Tr VND",
            experience: "Chưa có kinh nghiệm",
            expires: "31-03-2025",
            requirements: "Negotiation and customer service in retail.",
        },
        Row {
            title: "bi developer",
            salary: "1,000 - 2,000 USD",
            experience: "2 - 4 Năm",
            expires: "không rõ",
            requirements: "Experience with SQLite and Tableau.",
        },
        Row {
            title: "kế toán",
            salary: "Thỏa thuận",
            experience: "Not available",
            expires: "Expire date not found",
            requirements: "Accounting background.",
        },
    ];
    rows.into_iter().enumerate().map(|(i, r)| raw(i, r)).collect()
}

fn normalized() -> Vec<jobmarket::models::NormalizedJobRecord> {
    JobNormalizer::new(RATE).with_today(today()).normalize(batch())
}

#[test]
fn test_salary_resolution() {
    let jobs = normalized();
    assert_eq!(jobs[0].min_salary, Some(10_000_000.0));
    assert_eq!(jobs[0].max_salary, Some(20_000_000.0));
    assert_eq!(jobs[3].min_salary, Some(1_000.0 * RATE));
    assert_eq!(jobs[3].max_salary, Some(2_000.0 * RATE));

    // "up to" takes the mean minimum of the other parsed rows
    let mean_min = (10_000_000.0 + 20_000_000.0 + 1_000.0 * RATE) / 3.0;
    assert_eq!(jobs[2].salary, "Lên Đến 30 Tr Vnd");
    assert_eq!(jobs[2].min_salary, Some(mean_min));
    assert_eq!(jobs[2].max_salary, Some(30_000_000.0));

    // negotiable salary gets the rounded column means
    let all_min = (10_000_000.0 + 20_000_000.0 + mean_min + 1_000.0 * RATE) / 4.0;
    assert_eq!(jobs[4].min_salary, Some(f64::round_ties_even(all_min)));
    assert!(jobs.iter().all(|j| j.min_salary.is_some() && j.max_salary.is_some()));
}

#[test]
fn test_experience_resolution() {
    let jobs = normalized();
    assert_eq!((jobs[0].exp_min, jobs[0].exp_max), (Some(1.0), Some(3.0)));
    assert_eq!(jobs[2].experience, "Chưa Có Kinh Nghiệm");
    assert_eq!((jobs[2].exp_min, jobs[2].exp_max), (Some(0.0), Some(0.0)));

    // "more than 5" keeps its minimum and takes the mean maximum (3, 0, 4)
    let max_fill = f64::round_ties_even((3.0 + 0.0 + 4.0) / 3.0);
    assert_eq!((jobs[1].exp_min, jobs[1].exp_max), (Some(5.0), Some(max_fill)));

    let min_fill = f64::round_ties_even((1.0 + 5.0 + 0.0 + 2.0) / 4.0);
    assert_eq!(jobs[4].exp_min, Some(min_fill));
}

#[test]
fn test_dates_and_text() {
    let jobs = normalized();
    assert_eq!(jobs[0].date, NaiveDate::from_ymd_opt(2025, 3, 5));
    assert_eq!(jobs[0].expire_date, ExpireDate::On(today()));
    assert_eq!(
        jobs[1].expire_date,
        ExpireDate::On(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap())
    );
    assert_eq!(
        jobs[2].expire_date,
        ExpireDate::On(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())
    );
    assert_eq!(jobs[3].expire_date, ExpireDate::Unknown);
    assert_eq!(jobs[4].expire_date, ExpireDate::Unknown);

    assert_eq!(jobs[0].job_title, "Data Analyst");
    assert_eq!(jobs[0].company, "Công Ty Cổ Phần Abc");
    assert_eq!(jobs[0].location, "Hà Nội,Đà Nẵng");
}

#[test]
fn test_title_filters() {
    let jobs = normalized();
    let data_jobs = TitleFilter::data_jobs().apply(&jobs);
    let titles: Vec<&str> = data_jobs.iter().map(|j| j.job_title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Data Analyst", "Business Analyst (Phân Tích)", "Bi Developer"]
    );

    let analysts = TitleFilter::analyst_jobs().apply(&data_jobs);
    assert_eq!(analysts.len(), 2);
    // filtering twice changes nothing
    assert_eq!(TitleFilter::data_jobs().apply(&data_jobs), data_jobs);
    assert_eq!(TitleFilter::analyst_jobs().apply(&analysts), analysts);
}

#[tokio::test]
async fn test_skill_tagging_and_counts() {
    let jobs = normalized();
    let extractor = SkillExtractor::new(SkillVocabulary::builtin(), Box::new(NoopTranslator));
    let tagged = extractor.extract(jobs).await;

    assert!(tagged[3].hard_skills.contains(&"SQLite".to_string()));
    assert!(!tagged[3].hard_skills.contains(&"SQL".to_string()));
    assert_eq!(tagged[1].domains, vec!["Banking"]);

    let hard = skill_counts(&tagged, SkillCategory::Hard);
    assert_eq!(
        hard[0],
        SkillCount {
            skill: "SQL".to_string(),
            count: 2
        }
    );
    assert!(hard.windows(2).all(|w| w[0].count >= w[1].count));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed").join("hard_skills.csv");
    storage::write_skill_counts(&path, &hard).unwrap();
    assert_eq!(storage::read_skill_counts(&path).unwrap(), hard);

    let skills_path = dir.path().join("analyst_skills.csv");
    storage::write_skilled_jobs(&skills_path, &tagged).unwrap();
    let content = std::fs::read_to_string(&skills_path).unwrap();
    assert!(content.starts_with("Job Title,Company,"));
    assert!(content.lines().next().unwrap().ends_with("Soft Skills,Hard Skills,Domains"));
}
