//! Built-in hierarchies handed to institutions that have not saved one yet.

use feedbackhub_models::{Course, Department, HierarchyTree, Subject, SubjectType, Year};

/// A named seed hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultHierarchy {
    Standard,
    Engineering,
    Management,
    Pharmacy,
}

impl DefaultHierarchy {
    pub const ALL: [DefaultHierarchy; 4] = [
        DefaultHierarchy::Standard,
        DefaultHierarchy::Engineering,
        DefaultHierarchy::Management,
        DefaultHierarchy::Pharmacy,
    ];

    /// Picks the seed for an institution code; unknown or missing codes get
    /// the standard seed.
    pub fn for_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_lowercase()).as_deref() {
            Some("engineering") => DefaultHierarchy::Engineering,
            Some("management") => DefaultHierarchy::Management,
            Some("pharmacy") => DefaultHierarchy::Pharmacy,
            _ => DefaultHierarchy::Standard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DefaultHierarchy::Standard => "standard",
            DefaultHierarchy::Engineering => "engineering",
            DefaultHierarchy::Management => "management",
            DefaultHierarchy::Pharmacy => "pharmacy",
        }
    }

    pub fn build(&self, batches: &[String]) -> HierarchyTree {
        let seed = Seed { batches };
        match self {
            DefaultHierarchy::Standard => seed.standard(),
            DefaultHierarchy::Engineering => seed.engineering(),
            DefaultHierarchy::Management => seed.management(),
            DefaultHierarchy::Pharmacy => seed.pharmacy(),
        }
    }
}

struct Seed<'a> {
    batches: &'a [String],
}

impl Seed<'_> {
    fn subject(&self, name: &str, code: &str, subject_type: SubjectType) -> Subject {
        Subject::new(name, code, subject_type, self.batches.to_vec())
    }

    fn standard(&self) -> HierarchyTree {
        HierarchyTree::new(vec![
            Course::new("BSc").with_years(vec![
                Year::new("1").with_departments(vec![
                    Department::new("Physics").with_subjects(vec![
                        self.subject("Mechanics", "PHY101", SubjectType::Theory),
                        self.subject("Physics Lab", "PHY102", SubjectType::Practical),
                    ]),
                    Department::new("Mathematics").with_subjects(vec![
                        self.subject("Calculus", "MAT101", SubjectType::Theory),
                        self.subject("Linear Algebra", "MAT102", SubjectType::Tutorial),
                    ]),
                ]),
                Year::new("2"),
                Year::new("3"),
            ]),
            Course::new("BA").with_years(vec![
                Year::new("1").with_departments(vec![Department::new("English").with_subjects(
                    vec![self.subject("Literature", "ENG101", SubjectType::Theory)],
                )]),
                Year::new("2"),
                Year::new("3"),
            ]),
        ])
    }

    fn engineering(&self) -> HierarchyTree {
        HierarchyTree::new(vec![
            Course::new("B Tech").with_years(vec![
                Year::new("1").with_departments(vec![
                    Department::new("Computer Science").with_subjects(vec![
                        self.subject("Programming in C", "CS101", SubjectType::TheoryPractical),
                        self.subject("Discrete Mathematics", "CS102", SubjectType::Theory),
                    ]),
                    Department::new("Electronics & Communication").with_subjects(vec![
                        self.subject("Basic Electronics", "EC101", SubjectType::Theory),
                        self.subject("Electronics Lab", "EC102", SubjectType::Practical),
                    ]),
                ]),
                Year::new("2").with_departments(vec![Department::new("Computer Science")
                    .with_subjects(vec![
                        self.subject("Data Structures", "CS201", SubjectType::TheoryPractical),
                        self.subject("Operating Systems", "CS202", SubjectType::Theory),
                    ])]),
                Year::new("3"),
                Year::new("4"),
            ]),
            Course::new("M Tech").with_years(vec![
                Year::new("1").with_departments(vec![Department::new("Computer Science")
                    .with_subjects(vec![self.subject(
                        "Advanced Algorithms",
                        "CS501",
                        SubjectType::Theory,
                    )])]),
                Year::new("2"),
            ]),
        ])
    }

    fn management(&self) -> HierarchyTree {
        HierarchyTree::new(vec![
            Course::new("MBA").with_years(vec![
                Year::new("1").with_departments(vec![
                    Department::new("Finance").with_subjects(vec![
                        self.subject("Financial Accounting", "FIN101", SubjectType::Theory),
                        self.subject("Corporate Finance", "FIN102", SubjectType::Theory),
                    ]),
                    Department::new("Marketing").with_subjects(vec![self.subject(
                        "Marketing Management",
                        "MKT101",
                        SubjectType::Theory,
                    )]),
                ]),
                Year::new("2").with_departments(vec![Department::new("Human Resources")
                    .with_subjects(vec![self.subject(
                        "Organisational Behaviour",
                        "HR201",
                        SubjectType::Tutorial,
                    )])]),
            ]),
            Course::new("BBA").with_years(vec![
                Year::new("1").with_departments(vec![Department::new("Management Studies")
                    .with_subjects(vec![self.subject(
                        "Principles of Management",
                        "BBA101",
                        SubjectType::Theory,
                    )])]),
                Year::new("2"),
                Year::new("3"),
            ]),
        ])
    }

    fn pharmacy(&self) -> HierarchyTree {
        HierarchyTree::new(vec![
            Course::new("B Pharm").with_years(vec![
                Year::new("1").with_departments(vec![
                    Department::new("Pharmaceutics").with_subjects(vec![
                        self.subject("Pharmaceutics I", "BP101", SubjectType::TheoryPractical),
                    ]),
                    Department::new("Pharmaceutical Chemistry").with_subjects(vec![
                        self.subject("Inorganic Chemistry", "BP102", SubjectType::Theory),
                        self.subject("Chemistry Lab", "BP103", SubjectType::Practical),
                    ]),
                ]),
                Year::new("2"),
                Year::new("3"),
                Year::new("4"),
            ]),
            Course::new("D Pharm").with_years(vec![
                Year::new("1").with_departments(vec![Department::new("Pharmacology")
                    .with_subjects(vec![self.subject(
                        "Human Anatomy",
                        "DP101",
                        SubjectType::Theory,
                    )])]),
                Year::new("2"),
            ]),
        ])
    }
}
