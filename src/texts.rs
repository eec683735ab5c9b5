use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::TextSourceError;
use crate::session::Difficulty;

static TEXTS_DIR: Dir = include_dir!("src/texts");

const EMBEDDED_CORPUS: &str = "passages.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSample {
    pub id: String,
    pub text: String,
}

impl TextSample {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Samples grouped by difficulty, as stored in the corpus json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub easy: Vec<TextSample>,
    #[serde(default)]
    pub medium: Vec<TextSample>,
    #[serde(default)]
    pub hard: Vec<TextSample>,
}

impl Corpus {
    pub fn from_json(data: &str) -> Result<Self, TextSourceError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn tier_samples(&self, difficulty: Difficulty) -> &[TextSample] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn tier(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
        let samples = self.tier_samples(difficulty);
        if samples.is_empty() {
            return Err(TextSourceError::Empty(difficulty));
        }
        Ok(samples.to_vec())
    }
}

/// Supplies the passages a session can be run against
pub trait TextProvider {
    fn samples(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError>;
}

impl TextProvider for Corpus {
    fn samples(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
        self.tier(difficulty)
    }
}

/// Corpus compiled into the binary
#[derive(Debug, Clone)]
pub struct EmbeddedTexts {
    corpus: Corpus,
}

impl EmbeddedTexts {
    pub fn load() -> Result<Self, TextSourceError> {
        let file = TEXTS_DIR
            .get_file(EMBEDDED_CORPUS)
            .ok_or(TextSourceError::MissingFile(EMBEDDED_CORPUS))?;
        let data = file
            .contents_utf8()
            .ok_or(TextSourceError::MissingFile(EMBEDDED_CORPUS))?;

        Ok(Self {
            corpus: Corpus::from_json(data)?,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

impl TextProvider for EmbeddedTexts {
    fn samples(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
        self.corpus.tier(difficulty)
    }
}

/// User corpus on disk, re-read on every request
#[derive(Debug, Clone)]
pub struct FileTexts {
    path: PathBuf,
}

impl FileTexts {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TextProvider for FileTexts {
    fn samples(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
        let data = fs::read_to_string(&self.path).map_err(|source| TextSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Corpus::from_json(&data)?.tier(difficulty)
    }
}

/// One passage served for every difficulty
#[derive(Debug, Clone)]
pub struct FixedText {
    sample: TextSample,
}

impl FixedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            sample: TextSample::new("custom", text),
        }
    }
}

impl TextProvider for FixedText {
    fn samples(&self, _difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
        Ok(vec![self.sample.clone()])
    }
}

/// Built-in passage used whenever a provider cannot deliver
pub fn fallback_sample(difficulty: Difficulty) -> TextSample {
    match difficulty {
        Difficulty::Easy => TextSample::new(
            "easy-1",
            "The sun rose over the quiet town. Birds sang in the trees as people woke up and started their day. It was going to be a warm and sunny morning.",
        ),
        Difficulty::Medium => TextSample::new(
            "medium-1",
            "Learning a new skill takes patience and consistent practice. Whether you're studying a language, picking up an instrument, or mastering a sport, the key is to show up every day.",
        ),
        Difficulty::Hard => TextSample::new(
            "hard-1",
            "The philosopher's argument hinged on a seemingly paradoxical assertion: that absolute freedom, pursued without constraint, inevitably undermines itself.",
        ),
    }
}

/// Uniformly random sample for the tier, falling back to the built-in passage.
pub fn choose_sample<R: Rng + ?Sized>(
    provider: &dyn TextProvider,
    difficulty: Difficulty,
    rng: &mut R,
) -> TextSample {
    match provider.samples(difficulty) {
        Ok(samples) => match samples.choose(rng) {
            Some(sample) => sample.clone(),
            None => {
                warn!(%difficulty, "text provider returned no samples, using built-in text");
                fallback_sample(difficulty)
            }
        },
        Err(err) => {
            warn!(%difficulty, error = %err, "text provider unavailable, using built-in text");
            fallback_sample(difficulty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::tempdir;

    struct Broken;

    impl TextProvider for Broken {
        fn samples(&self, difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
            Err(TextSourceError::Empty(difficulty))
        }
    }

    struct Nothing;

    impl TextProvider for Nothing {
        fn samples(&self, _difficulty: Difficulty) -> Result<Vec<TextSample>, TextSourceError> {
            Ok(vec![])
        }
    }

    #[test]
    fn embedded_corpus_has_every_tier() {
        let texts = EmbeddedTexts::load().unwrap();

        for difficulty in Difficulty::ALL {
            let samples = texts.samples(difficulty).unwrap();
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| !s.text.is_empty()));
        }
    }

    #[test]
    fn embedded_sample_ids_are_unique() {
        let texts = EmbeddedTexts::load().unwrap();
        let corpus = texts.corpus();
        let ids: Vec<&str> = Difficulty::ALL
            .iter()
            .flat_map(|d| corpus.tier_samples(*d))
            .map(|s| s.id.as_str())
            .collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();

        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn corpus_missing_tier_is_empty() {
        let corpus = Corpus::from_json(r#"{ "easy": [{ "id": "e", "text": "abc" }] }"#).unwrap();

        assert_eq!(corpus.tier_samples(Difficulty::Easy).len(), 1);
        assert_matches!(
            corpus.tier(Difficulty::Hard),
            Err(TextSourceError::Empty(Difficulty::Hard))
        );
    }

    #[test]
    fn corpus_rejects_bad_json() {
        assert_matches!(Corpus::from_json("{ nope"), Err(TextSourceError::Parse(_)));
    }

    #[test]
    fn file_texts_reads_corpus() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texts.json");
        fs::write(
            &path,
            r#"{ "medium": [{ "id": "m-1", "text": "from a file" }] }"#,
        )
        .unwrap();

        let samples = FileTexts::new(&path).samples(Difficulty::Medium).unwrap();
        assert_eq!(samples, vec![TextSample::new("m-1", "from a file")]);
    }

    #[test]
    fn file_texts_missing_file() {
        let dir = tempdir().unwrap();
        let texts = FileTexts::new(dir.path().join("absent.json"));

        assert_matches!(
            texts.samples(Difficulty::Easy),
            Err(TextSourceError::Io { .. })
        );
    }

    #[test]
    fn fixed_text_for_every_tier() {
        let texts = FixedText::new("hi");
        for difficulty in Difficulty::ALL {
            let samples = texts.samples(difficulty).unwrap();
            assert_eq!(samples.len(), 1);
            assert_eq!(samples[0].text, "hi");
        }
    }

    #[test]
    fn choose_falls_back_on_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample = choose_sample(&Broken, Difficulty::Hard, &mut rng);
        assert_eq!(sample, fallback_sample(Difficulty::Hard));
    }

    #[test]
    fn choose_falls_back_on_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample = choose_sample(&Nothing, Difficulty::Medium, &mut rng);
        assert_eq!(sample, fallback_sample(Difficulty::Medium));
    }

    #[test]
    fn choose_stays_within_tier() {
        let texts = EmbeddedTexts::load().unwrap();
        let tier = texts.samples(Difficulty::Easy).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let sample = choose_sample(&texts, Difficulty::Easy, &mut rng);
            assert!(tier.contains(&sample));
        }
    }

    #[test]
    fn choose_reaches_every_sample() {
        let texts = EmbeddedTexts::load().unwrap();
        let tier = texts.samples(Difficulty::Hard).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let seen: HashSet<String> = (0..200)
            .map(|_| choose_sample(&texts, Difficulty::Hard, &mut rng).id)
            .collect();
        assert_eq!(seen.len(), tier.len());
    }
}
