// src/engine/settings.rs

use std::collections::HashMap;

use url::form_urlencoded;

use crate::{
    error::AppError,
    models::{
        quiz::{Difficulty, QuizMode, Topic},
        settings::{QuizConfiguration, TopicSelection},
    },
};

/// Parses quiz settings from a query string such as
/// `topics=python_core,big_o&difficulty=junior&mode=exam&size=10`.
///
/// All-or-nothing: any invalid required field rejects the whole query.
/// The leading `?` is optional.
pub fn parse_settings(query: &str) -> Result<QuizConfiguration, AppError> {
    let query = query.trim().trim_start_matches('?');

    // First occurrence of each key wins.
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let difficulty = params
        .get("difficulty")
        .ok_or_else(|| AppError::Validation("Missing difficulty".to_string()))?
        .parse::<Difficulty>()
        .map_err(AppError::Validation)?;

    let mode = params
        .get("mode")
        .ok_or_else(|| AppError::Validation("Missing mode".to_string()))?
        .parse::<QuizMode>()
        .map_err(AppError::Validation)?;

    let topics = parse_topics(params.get("topics"), params.get("topic"))?;

    let size = params.get("size").and_then(|raw| parse_size(raw));

    Ok(QuizConfiguration {
        topics,
        difficulty,
        mode,
        size,
    })
}

fn parse_topics(
    topics: Option<&String>,
    topic: Option<&String>,
) -> Result<TopicSelection, AppError> {
    if let Some(list) = topics {
        let mut selected: Vec<Topic> = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.parse::<Topic>() {
                Ok(Topic::Random) | Err(_) => continue,
                Ok(topic) if !selected.contains(&topic) => selected.push(topic),
                Ok(_) => {}
            }
        }

        if selected.is_empty() {
            return Err(AppError::Validation(
                "No valid topics selected".to_string(),
            ));
        }
        return Ok(TopicSelection::Topics(selected));
    }

    match topic {
        Some(raw) => match raw.parse::<Topic>().map_err(AppError::Validation)? {
            Topic::Random => Ok(TopicSelection::Random),
            topic => Ok(TopicSelection::Topics(vec![topic])),
        },
        None => Err(AppError::Validation("Missing topic".to_string())),
    }
}

/// Non-numeric sizes are ignored; numeric sizes are clamped to at least 1.
fn parse_size(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(value.max(1.0).min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_topic() {
        let config = parse_settings("topic=python_core&difficulty=junior&mode=practice&size=5")
            .unwrap();
        assert_eq!(config.topics, TopicSelection::Topics(vec![Topic::PythonCore]));
        assert_eq!(config.difficulty, Difficulty::Junior);
        assert_eq!(config.mode, QuizMode::Practice);
        assert_eq!(config.size, Some(5));
    }

    #[test]
    fn test_parse_random_topic() {
        let config = parse_settings("?topic=random&difficulty=middle&mode=exam").unwrap();
        assert_eq!(config.topics, TopicSelection::Random);
        assert_eq!(config.size, None);
        assert_eq!(config.signature(), "quizstate:random:middle:exam:default");
    }

    #[test]
    fn test_topics_list_filters_and_dedupes() {
        let config = parse_settings(
            "topics=%20big_o%20,random,,nonsense,big_o,algorithms&difficulty=junior&mode=practice",
        )
        .unwrap();
        assert_eq!(
            config.topics,
            TopicSelection::Topics(vec![Topic::BigO, Topic::Algorithms])
        );
        assert_eq!(config.attempt_topic(), "mix");
    }

    #[test]
    fn test_topics_list_takes_precedence_over_topic() {
        let config =
            parse_settings("topic=random&topics=data_structures&difficulty=junior&mode=exam")
                .unwrap();
        assert_eq!(
            config.topics,
            TopicSelection::Topics(vec![Topic::DataStructures])
        );
    }

    #[test]
    fn test_rejections() {
        let rejected = [
            "",
            "topic=python_core&mode=practice",
            "topic=python_core&difficulty=junior",
            "topic=python_core&difficulty=senior&mode=practice",
            "topic=python_core&difficulty=junior&mode=speedrun",
            "topic=cobol&difficulty=junior&mode=practice",
            "topics=random,,cobol&difficulty=junior&mode=practice",
            "difficulty=junior&mode=practice",
        ];
        for query in rejected {
            let err = parse_settings(query).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "accepted: {}", query);
        }
    }

    #[test]
    fn test_size_clamped_and_ignored_when_not_numeric() {
        let zero = parse_settings("topic=big_o&difficulty=junior&mode=practice&size=0").unwrap();
        assert_eq!(zero.size, Some(1));

        let negative =
            parse_settings("topic=big_o&difficulty=junior&mode=practice&size=-4").unwrap();
        assert_eq!(negative.size, Some(1));

        let junk = parse_settings("topic=big_o&difficulty=junior&mode=practice&size=lots").unwrap();
        assert_eq!(junk.size, None);
    }

    #[test]
    fn test_parser_is_deterministic() {
        let query = "topics=algorithms,big_o&difficulty=middle&mode=exam&size=12";
        let a = parse_settings(query).unwrap();
        let b = parse_settings(query).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.signature(), "quizstate:algorithms|big_o:middle:exam:12");
    }
}
