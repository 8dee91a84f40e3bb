/// One technology the extractor can recognize, with the static metadata
/// carried into the exports and the warehouse. Competency codes reference
/// the FGOS 09.03.03 direction and the 06.001/06.022 professional
/// standards.
#[derive(Debug, Clone, Copy)]
pub struct Technology {
    pub name: &'static str,
    pub category: &'static str,
    pub level: &'static str,
    pub domain: &'static str,
    pub fgos_competencies: &'static [&'static str],
    pub prof_standards: &'static [&'static str],
}

pub const CATEGORY_LANGUAGE: &str = "Язык программирования";
pub const CATEGORY_FRAMEWORK: &str = "Фреймворк";
pub const CATEGORY_DATABASE: &str = "База данных";
pub const CATEGORY_DEVOPS: &str = "DevOps";
pub const CATEGORY_TOOL: &str = "Инструмент";

pub const TECHNOLOGIES: &[Technology] = &[
    Technology {
        name: "Python",
        category: CATEGORY_LANGUAGE,
        level: "middle",
        domain: "backend",
        fgos_competencies: &["ПК-1", "ПК-2", "ПК-3"],
        prof_standards: &["06.001_A", "06.001_B"],
    },
    Technology {
        name: "JavaScript",
        category: CATEGORY_LANGUAGE,
        level: "middle",
        domain: "frontend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "TypeScript",
        category: CATEGORY_LANGUAGE,
        level: "middle",
        domain: "frontend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "Java",
        category: CATEGORY_LANGUAGE,
        level: "middle",
        domain: "backend",
        fgos_competencies: &["ПК-1", "ПК-2", "ПК-3"],
        prof_standards: &["06.001_A", "06.001_B"],
    },
    Technology {
        name: "React",
        category: CATEGORY_FRAMEWORK,
        level: "middle",
        domain: "frontend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "Vue",
        category: CATEGORY_FRAMEWORK,
        level: "middle",
        domain: "frontend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "Django",
        category: CATEGORY_FRAMEWORK,
        level: "middle",
        domain: "backend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A", "06.001_B"],
    },
    Technology {
        name: "Flask",
        category: CATEGORY_FRAMEWORK,
        level: "middle",
        domain: "backend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A", "06.001_B"],
    },
    Technology {
        name: "Node.js",
        category: CATEGORY_FRAMEWORK,
        level: "middle",
        domain: "backend",
        fgos_competencies: &["ПК-1", "ПК-2"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "SQL",
        category: CATEGORY_DATABASE,
        level: "basic",
        domain: "data",
        fgos_competencies: &["ПК-2", "ПК-3"],
        prof_standards: &["06.001_B", "06.022_A"],
    },
    Technology {
        name: "PostgreSQL",
        category: CATEGORY_DATABASE,
        level: "middle",
        domain: "data",
        fgos_competencies: &["ПК-2", "ПК-3"],
        prof_standards: &["06.001_B"],
    },
    Technology {
        name: "MongoDB",
        category: CATEGORY_DATABASE,
        level: "middle",
        domain: "data",
        fgos_competencies: &["ПК-2", "ПК-3"],
        prof_standards: &["06.001_B"],
    },
    Technology {
        name: "Docker",
        category: CATEGORY_DEVOPS,
        level: "advanced",
        domain: "infrastructure",
        fgos_competencies: &["ПК-3", "ПК-4"],
        prof_standards: &["06.001_C"],
    },
    Technology {
        name: "Kubernetes",
        category: CATEGORY_DEVOPS,
        level: "advanced",
        domain: "infrastructure",
        fgos_competencies: &["ПК-3", "ПК-4"],
        prof_standards: &["06.001_C"],
    },
    Technology {
        name: "Git",
        category: CATEGORY_TOOL,
        level: "basic",
        domain: "development",
        fgos_competencies: &["ПК-1"],
        prof_standards: &["06.001_A"],
    },
    Technology {
        name: "Linux",
        category: CATEGORY_TOOL,
        level: "middle",
        domain: "infrastructure",
        fgos_competencies: &["ПК-2", "ПК-4"],
        prof_standards: &["06.001_C"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in TECHNOLOGIES.iter().enumerate() {
            for b in &TECHNOLOGIES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn every_entry_carries_competencies() {
        for tech in TECHNOLOGIES {
            assert!(
                !tech.fgos_competencies.is_empty(),
                "{} has no FGOS codes",
                tech.name
            );
            assert!(
                !tech.prof_standards.is_empty(),
                "{} has no standard codes",
                tech.name
            );
        }
    }
}
