//! Curated skill and domain vocabularies.

/// Transferable, non-technical skills.
pub const SOFT_SKILLS: &[&str] = &[
    "Accountability", "Adaptability", "Adaptability in Change", "Active Learning",
    "Analytical Thinking", "Attention To Detail", "Building Rapport", "Business Acumen",
    "Change Management", "Coaching", "Cognitive Flexibility", "Collaboration", "Compassion",
    "Communication", "Conflict Management", "Conflict Mediation", "Conflict Prevention",
    "Conflict Resolution", "Consensus Building", "Creativity", "Critical Decision Making",
    "Critical Observation", "Critical Thinking", "Cross-Cultural", "Cultural Awareness",
    "Cultural Sensitivity", "Curiosity", "Customer Service", "Customer Retention",
    "Customer-Centric Mindset", "Clarity", "Data-Driven", "Decision Making", "Delegation",
    "Diplomacy", "Diversity and Inclusion Awareness", "Effective Delegation",
    "Emotional Intelligence", "Emotional Regulation", "Empathy", "Empowerment", "Enthusiasm",
    "Ethical Judgment", "Facilitation", "Fast Learner", "Fast Problem Assessment",
    "Feedback Incorporation", "Flexibility", "Focus", "Giving and Receiving Feedback",
    "Goal Setting", "Grit", "Growth Mindset", "Handling Criticism", "Humility", "Kindness",
    "Influencing", "Initiative", "Imagination", "Insight Generation", "Innovation",
    "Interpersonal", "Inclusivity", "Intuition", "Leadership", "Listening",
    "Logical Reasoning", "Mentoring", "Mindfulness", "Motivational", "Negotiation",
    "Networking", "Open-Mindedness", "Optimism", "Optimistic Thinking", "Ownership Mentality",
    "Patience", "People Management", "Persuasion", "Positive Attitude", "Presentation",
    "Precision", "Problem Sensitivity", "Problem-Framing", "Problem-Solving", "Perseverance",
    "Process Improvement", "Process Optimization", "Professionalism", "Public Speaking",
    "Relationship Building", "Relationship Maintenance", "Reliability", "Resilience",
    "Resourcefulness", "Risk Management", "Scenario Planning", "Self-Awareness",
    "Self-Confidence", "Self-Discipline", "Self-Learning", "Self-Motivation",
    "Self-Reflection", "Sensitivity", "Situational Awareness", "Stakeholder Management",
    "Storytelling", "Spontaneity", "Strategic Thinking", "Stress Management",
    "Synthesizing Information", "Systems Thinking", "Task Prioritization", "Team Building",
    "Time Management", "Tolerance", "Trustworthiness", "Transparency", "Visionary Thinking",
    "Work Ethic", "Work-Life Balance",
];

/// Tools, techniques and technical disciplines.
pub const HARD_SKILLS: &[&str] = &[
    // Business Intelligence & Data Visualization
    "Amazon QuickSight", "Business Intelligence Tools", "Dashboard", "Data Democratization",
    "Data Storytelling", "Data Visualization", "Domo", "Embedded Analytics", "Figma",
    "Google Data Studio", "Looker", "Metric Design", "Metabase", "MicroStrategy",
    "Mode Analytics", "Power BI", "PowerPoint", "Qlik Sense", "QlikView", "Report",
    "Self-Service BI", "Sisense", "Tableau", "ThoughtSpot", "TIBCO Spotfire", "Zoho Analytics",
    "JIRA", "Confluence",
    // Business & Market Analysis
    "Asset Valuation", "Business Process Improvement", "Churn Prediction", "Cohort Analysis",
    "Consumer Behavior Analysis", "Credit Risk Modeling", "Customer Lifetime Value",
    "Customer Segmentation", "Data-Driven Decision Making", "Econometric Modeling",
    "Financial Forecasting", "Financial Modeling", "Financial Risk Management",
    "Market Research", "Marketing Mix Modeling", "Portfolio Optimization",
    "Predictive Modeling", "Pricing Strategy", "Procurement Analytics", "Product Analytics",
    "Risk Assessment", "Ad-hoc",
    // Statistics & Analytics
    "A/B Testing", "Anomaly Detection", "Bayesian Inference", "Causal Inference",
    "Chi-Square Testing", "Cluster Analysis", "Decision Trees", "Descriptive Statistics",
    "Exploratory Data Analysis", "EDA", "Factor Analysis", "Funnel Analysis",
    "Hypothesis Testing", "Statistics", "K-Means", "Latent Variable Modeling", "Mathematics",
    "Metric Design", "Monte Carlo Simulation", "Multivariate Analysis",
    "Nonparametric Statistics", "Panel Data Analysis", "Predictive Analytics",
    "Problem-Framing", "Quantitative Research", "Regression Analysis", "SEM",
    "Sentiment Analysis", "SPSS", "Statistical Analysis", "Statistical Inference",
    "Statistical Modeling", "Structural Equation Modeling", "Survival Analysis",
    "Time Series Analysis",
    // Database & Data Engineering
    "Amazon Athena", "Apache Airflow", "Apache Druid", "Apache Flink", "Apache Hive",
    "Apache NiFi", "Apache Pinot", "Azure Synapse Analytics", "BigQuery", "Cassandra",
    "Change Data Capture", "ClickHouse", "CockroachDB", "Data Blending", "Data Cleaning",
    "Data Engineering", "Data Governance", "Data Integration", "Data Management", "Data Mart",
    "Data Mining", "Data Modeling", "Data Orchestration", "Data Pipeline Development",
    "Data Quality Management", "Data Warehousing", "Database Management", "Delta Lake",
    "Dremio", "ETL", "Fivetran", "Google Bigtable", "Graph Database", "Greenplum", "Hadoop",
    "HDFS", "IBM", "IBM Db2", "Kafka", "MariaDB", "MongoDB", "MySQL", "Neo4j", "NoSQL", "OLAP",
    "OLTP", "PostgreSQL", "Presto", "Redshift", "SAP HANA", "Snowflake", "Spark SQL", "SQL",
    "SQLite", "Starburst", "Trino", "Vertica",
    // Cloud & DevOps
    "AWS", "Azure", "Bitbucket", "CI/CD Pipelines", "Data Pipeline", "Cloud Computing",
    "Cloud Data Warehousing", "Cloud Security", "Continuous Deployment",
    "Continuous Integration", "Databricks", "DataOps", "DevOps", "Docker", "Docker Swarm",
    "FinOps", "Git", "GitHub", "GitLab", "Google Cloud Platform", "Helm", "Hybrid Cloud",
    "Istio", "Jenkins", "Kubernetes", "Microservices", "Multi-Cloud", "Serverless Computing",
    "Terraform", "Terraform Cloud", "Vertex AI",
    // AI & Machine Learning
    "AI Ethics", "AutoML", "Bayesian Optimization", "ChatGPT", "Computer Vision",
    "Deep Learning", "Feature Engineering", "Federated Learning", "Generative AI",
    "Hugging Face", "Keras", "Large Language Models", "LangChain", "Machine Learning", "MLOps",
    "Natural Language Processing", "NLP", "Neural Networks", "Predictive Analytics", "PyCaret",
    "PyTorch", "Reinforcement Learning", "Scikit-Learn", "Self-Supervised Learning",
    "TensorFlow", "Transformer Models", "Vector Databases", "XGBoost", "LightGBM",
    "Stable Diffusion", "Object Detection",
    // Automation & Scripting
    "Airflow", "Alteryx", "Ansible", "Apache NiFi", "Automation", "AutoHotkey", "Bash",
    "Excel", "Google Analytics", "Google Sheet", "IBM Watson", "Informatica", "JMP", "Knime",
    "Macros", "Matlab", "Matplotlib", "Operational Research", "Pandas", "Pipeline",
    "Powershell", "Process Mining", "Python", "Python Automation", "R", "RPA",
    "Robotic Process Automation", "SAS", "Scipy", "Scrape", "Scraping", "Scripting",
    "SEO Optimization", "Shell Scripting", "Task Scheduling", "VBA", "Web Scraping",
    "Workflow Automation", "Power Automate",
    // ERP, CRM & Business Systems
    "CRM", "ERP", "HubSpot CRM", "Microsoft Dynamics 365", "NetSuite", "Oracle ERP", "SAP",
    "Salesforce", "Workday",
    // Cybersecurity & Compliance
    "Cloud Security", "Cryptography", "Cybersecurity", "Data Privacy Engineering",
    "Ethical Hacking", "GDPR Compliance", "IAM", "Identity Access Management",
    "Penetration Testing", "Security Information and Event Management", "SIEM",
    "SOC 2 Compliance", "SOC Compliance", "Threat Intelligence", "Zero Trust Security",
    "Zero-Day Exploits",
    // Supply Chain & Operations
    "Demand Forecasting", "Lean Six Sigma", "Logistics Analytics", "Network Optimization",
    "Operations Research", "Process Mapping", "Smart Warehousing", "Supply Chain Analytics",
    // Software Development & Optimization
    "Algorithms", "Code Optimization", "Code Profiling", "Concurrency Control",
    "Embedded Systems", "Julia", "Low-Code/No-Code Development", "Optimization",
    "Parallel Computing", "Perl", "Process Optimization", "Rust", "Scala",
    "Software Development Life Cycle", "SDLC", "Test-Driven Development",
    // Web & Marketing Analytics
    "Adobe Analytics", "Attribution Modeling", "Customer Journey Analytics", "Facebook Pixel",
    "Google Tag Manager", "Heatmap Analysis", "Marketing Analytics",
    "Programmatic Advertising", "Scraping", "Tag Management", "Web Analytics",
    // Advanced Computing & Security
    "Edge Computing", "Fog Computing", "Homomorphic Encryption", "IoT", "Quantum Cryptography",
    "Real-Time Analytics",
];

/// Industry domains.
pub const DOMAINS: &[&str] = &[
    "3D Printing", "Accounting", "Actuarial Science", "Advertising", "Aerospace",
    "Agribusiness", "Agriculture", "Alternative Medicine", "Animal Science", "Anthropology",
    "Apparel", "Aquaculture", "Archaeology", "Architecture", "Artificial Intelligence",
    "Audit", "Asset Management", "Astronomy", "Astrophysics", "Athletics", "Audio Engineering",
    "Augmented Reality", "Automotive", "Aviation", "Banking", "Behavioral Science",
    "Bioinformatics", "Biometrics", "Biotechnology", "Blockchain", "Broadcasting",
    "Call Center", "Chemical Engineering", "Cinematography", "Cloud Computing", "Coaching",
    "Cognitive Science", "Commercial Real Estate", "Compliance", "Construction", "Consulting",
    "Consumer Goods", "Corporate Finance", "Cryptocurrency", "Culinary Arts", "Cybersecurity",
    "Dairy", "Dentistry", "Digital Marketing", "Drone Technology", "Ecommerce", "Econometrics",
    "Economic Policy", "Education", "Elder Care", "Electric Vehicles",
    "Electrical Engineering", "Electronics", "Embedded Systems", "Emergency Management",
    "Energy", "Entertainment", "Environmental Science", "Ethical Hacking", "Event Management",
    "Fashion", "Finance", "Fire Safety", "Fitness", "FMCG", "Food Science", "Forensic Science",
    "Forestry", "Fraud Detection", "Fulfillment", "Gaming", "Genetics", "Geology",
    "Geospatial", "Glass", "Government", "Green Energy", "Healthcare", "Health Economics",
    "Health Informatics", "Health Policy", "History", "Home Improvement", "Hospitality",
    "Human Resources", "HR", "Human Rights", "Immunology", "Industrial Automation",
    "Industrial Design", "Industrial Engineering", "Information Security", "Infrastructure",
    "Insurance", "Interior Design", "Inventory", "Journalism", "Labor Relations",
    "Landscape Architecture", "Law", "Library Science", "Linguistics", "Logistics",
    "Luxury Goods", "Machine Learning", "Manufacturing", "Marine Biology", "Marine Shipping",
    "Marketing", "Materials Science", "Mechanical Engineering", "Media", "Medical",
    "Meteorology", "Microbiology", "Military Strategy", "Mining", "Mobile App",
    "Molecular Biology", "Music", "Nanotechnology", "Neurology", "Neuroscience", "Nonprofit",
    "Nuclear Energy", "Nutritional Science", "Occupational Therapy", "Oil & Gas",
    "Operations Management", "Optometry", "Paper", "Pathology", "Performing Arts",
    "Personal Finance", "Petroleum Engineering", "Pharmaceutical", "Philanthropy",
    "Photography", "Physics", "Physiotherapy", "Political Science", "Printing",
    "Private Equity", "Product Design", "Product Management", "Project Management",
    "Psychiatry", "Psychology", "Public Administration", "Public Health", "Public Policy",
    "Public Relations", "Quality Assurance", "Quantum Computing", "Railway", "Real Estate",
    "Recreation", "Recruitment", "Rehabilitation", "Renewable Energy", "Research", "Retail",
    "Revenue Generation", "Risk Management", "Robotics", "Satellite Communications",
    "Security", "Sales", "Semiconductors", "SEO", "Social Media", "Social Work", "Sociology",
    "Solar Power", "Supply Chain", "Sustainable Development", "Taxation", "Tax", "Technology",
    "Telecommunications", "Textiles", "Tourism", "Transportation", "Urban Planning",
    "Utilities", "Venture Capital", "Veterinary", "Virtual Reality", "Waste Management",
    "Water Management", "Web Analytics", "Wellness", "Wholesale", "Wildlife Conservation",
    "Wind Energy", "Zoology",
];
