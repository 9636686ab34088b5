// src/services/quiz_catalog.rs

use std::{collections::HashSet, sync::Arc};

use crate::{
    error::AppError,
    models::question::{Quiz, QuizSummary},
};

const BUILTIN_CATALOG: &str = include_str!("../../data/quizzes.json");

/// Read-only set of quizzes learners can attempt.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: Vec<Arc<Quiz>>,
}

impl QuizCatalog {
    /// Validates every quiz up front. Duplicate quiz ids are rejected.
    pub fn from_quizzes(quizzes: Vec<Quiz>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for quiz in &quizzes {
            quiz.ensure_valid()?;
            if !seen.insert(quiz.id.clone()) {
                return Err(AppError::ValidationError(format!(
                    "duplicate quiz id '{}'",
                    quiz.id
                )));
            }
        }

        Ok(Self {
            quizzes: quizzes.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let quizzes: Vec<Quiz> = serde_json::from_str(raw)?;
        Self::from_quizzes(quizzes)
    }

    /// Reads the catalog at `path`, or falls back to the bundled one.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let catalog = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AppError::ConfigError(format!("cannot read quiz catalog '{}': {}", path, e))
                })?;
                Self::from_json(&raw)?
            }
            None => Self::from_json(BUILTIN_CATALOG)?,
        };

        tracing::info!("Loaded quiz catalog with {} quizzes", catalog.quizzes.len());
        Ok(catalog)
    }

    /// Quizzes for `subject` (exact id) whose title, description or topic
    /// contains `search`, case-insensitively. Empty filters match all.
    pub fn list(&self, subject: Option<&str>, search: Option<&str>) -> Vec<QuizSummary> {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();

        self.quizzes
            .iter()
            .filter(|q| match subject.map(str::trim) {
                Some(subject) if !subject.is_empty() => q.subject == subject,
                _ => true,
            })
            .filter(|q| {
                needle.is_empty()
                    || q.title.to_lowercase().contains(&needle)
                    || q.description.to_lowercase().contains(&needle)
                    || q.topic.to_lowercase().contains(&needle)
            })
            .map(|q| QuizSummary::from(q.as_ref()))
            .collect()
    }

    /// Quizzes of `subject` whose topic is `topic`, ignoring case.
    pub fn for_topic(&self, subject: &str, topic: &str) -> Vec<QuizSummary> {
        self.quizzes
            .iter()
            .filter(|q| q.subject == subject && q.topic.eq_ignore_ascii_case(topic))
            .map(|q| QuizSummary::from(q.as_ref()))
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Arc<Quiz>, AppError> {
        self.quizzes
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Quiz '{}' not found", id)))
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::tests::question;

    fn quiz(id: &str, subject: &str, topic: &str) -> Quiz {
        Quiz {
            id: id.to_string(),
            title: format!("{} quiz", topic),
            description: String::new(),
            subject: subject.to_string(),
            topic: topic.to_string(),
            difficulty: "medium".to_string(),
            questions: vec![question("q1", 0), question("q2", 1)],
        }
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = QuizCatalog::load(None).unwrap();
        assert!(!catalog.is_empty());
        let algebra = catalog.get("math-algebra-1").unwrap();
        assert_eq!(algebra.questions.len(), 5);
        assert_eq!(algebra.questions[2].correct_answer, 1);
    }

    #[test]
    fn list_filters_by_subject_and_search() {
        let catalog = QuizCatalog::from_quizzes(vec![
            quiz("a", "math", "Algebra"),
            quiz("g", "math", "Geometry"),
            quiz("p", "science", "Physics"),
        ])
        .unwrap();

        let math: Vec<_> = catalog.list(Some("math"), None).into_iter().map(|q| q.id).collect();
        assert_eq!(math, vec!["a", "g"]);

        let geo: Vec<_> = catalog
            .list(None, Some("GEOM"))
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(geo, vec!["g"]);

        assert!(catalog.list(Some("science"), Some("algebra")).is_empty());
        assert_eq!(catalog.list(Some(""), Some("  ")).len(), 3);

        let physics: Vec<_> = catalog
            .for_topic("science", "physics")
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(physics, vec!["p"]);
        assert!(catalog.for_topic("math", "Physics").is_empty());
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_answer_keys() {
        let dup = QuizCatalog::from_quizzes(vec![quiz("a", "math", "x"), quiz("a", "math", "y")]);
        assert!(matches!(dup, Err(AppError::ValidationError(_))));

        let mut broken = quiz("b", "math", "x");
        broken.questions[0].correct_answer = 9;
        assert!(QuizCatalog::from_quizzes(vec![broken]).is_err());
    }

    #[test]
    fn unknown_quiz_is_not_found() {
        let catalog = QuizCatalog::default();
        assert!(matches!(catalog.get("nope"), Err(AppError::NotFound(_))));
    }
}
