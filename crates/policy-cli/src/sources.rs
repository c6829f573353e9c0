//! Catalogue of the policy pages the knowledge base was built from

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KnowledgeSource {
    pub title: &'static str,
    pub url: &'static str,
}

pub const POLICY_SOURCES: &[KnowledgeSource] = &[
    KnowledgeSource {
        title: "Sport and Wellness",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/sport-and-wellness-facilities-and",
    },
    KnowledgeSource {
        title: "Attendance",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/student-attendance-policy",
    },
    KnowledgeSource {
        title: "Final Grade",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/final-grade-policy",
    },
    KnowledgeSource {
        title: "Student Conduct",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/student-conduct-policy",
    },
    KnowledgeSource {
        title: "Academic Schedule",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/udst-policies-and-procedures/academic-schedule-policy",
    },
    KnowledgeSource {
        title: "Student Appeals",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/student-appeals-policy",
    },
    KnowledgeSource {
        title: "Transfer Policy",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/transfer-policy",
    },
    KnowledgeSource {
        title: "Admissions",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/admissions-policy",
    },
    KnowledgeSource {
        title: "Registration",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/policies-and-procedures/registration-policy",
    },
    KnowledgeSource {
        title: "Graduation Policy",
        url: "https://www.udst.edu.qa/about-udst/institutional-excellence-ie/udst-policies-and-procedures/graduation-policy",
    },
];

/// Look up a source by case-insensitive title
pub fn find_source(title: &str) -> Option<&'static KnowledgeSource> {
    POLICY_SOURCES
        .iter()
        .find(|source| source.title.eq_ignore_ascii_case(title.trim()))
}
