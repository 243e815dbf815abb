use include_dir::{include_dir, Dir};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::error::CorpusError;

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");

const DEFAULT_CORPUS_FILE: &str = "passages.txt";

/// A line holding only this token separates two passages.
pub const PASSAGE_SEPARATOR: &str = "%%";

/// The bank of passages a test prompt is drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    passages: Vec<String>,
}

impl Corpus {
    /// Parse separator-delimited text. Lines inside a passage are joined with
    /// single spaces and blank passages are dropped.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let mut passages = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim() == PASSAGE_SEPARATOR {
                push_passage(&mut passages, &current);
                current.clear();
            } else {
                current.push(line);
            }
        }
        push_passage(&mut passages, &current);

        Self::from_passages(passages)
    }

    pub fn from_passages<I, S>(passages: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let passages = passages
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect::<Vec<String>>();

        if passages.is_empty() {
            return Err(CorpusError::Empty);
        }

        Ok(Self { passages })
    }

    /// The corpus compiled into the binary
    pub fn embedded() -> Result<Self, CorpusError> {
        let text = CORPUS_DIR
            .get_file(DEFAULT_CORPUS_FILE)
            .and_then(|file| file.contents_utf8())
            .ok_or(CorpusError::MissingEmbedded {
                name: DEFAULT_CORPUS_FILE,
            })?;

        Self::parse(text)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let corpus = Self::parse(&text)?;
        debug!(
            "loaded {} passages from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

fn push_passage(passages: &mut Vec<String>, lines: &[&str]) {
    let passage = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");

    if !passage.is_empty() {
        passages.push(passage);
    }
}

/// Pick one passage uniformly at random. A corpus is never empty, so this
/// always yields a prompt.
pub fn choose_random_prompt<R: Rng + ?Sized>(corpus: &Corpus, rng: &mut R) -> String {
    corpus
        .passages
        .choose(rng)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn embedded_corpus_has_four_passages() {
        let corpus = Corpus::embedded().unwrap();

        assert_eq!(corpus.len(), 4);
        assert!(corpus.passages()[0].starts_with("Wombats poop in cubes."));
        assert!(corpus.passages()[3].ends_with("stay wrinkle free all day."));
    }

    #[test]
    fn parse_splits_on_separator_lines() {
        let corpus = Corpus::parse("first passage\n%%\nsecond\npassage\n  %%  \nthird").unwrap();

        assert_eq!(
            corpus.passages(),
            &["first passage", "second passage", "third"]
        );
    }

    #[test]
    fn parse_drops_blank_passages() {
        let corpus = Corpus::parse("%%\n\n%%\nonly one\n%%\n   \n").unwrap();

        assert_eq!(corpus.passages(), &["only one"]);
    }

    #[test]
    fn separator_inside_a_line_is_text() {
        let corpus = Corpus::parse("100%% sure").unwrap();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.passages()[0], "100%% sure");
    }

    #[test]
    fn empty_corpus_is_an_error() {
        assert_matches!(Corpus::parse(""), Err(CorpusError::Empty));
        assert_matches!(Corpus::parse("%%\n%%"), Err(CorpusError::Empty));
        assert_matches!(
            Corpus::from_passages(Vec::<String>::new()),
            Err(CorpusError::Empty)
        );
    }

    #[test]
    fn from_file_reads_passages() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alpha beta\n%%\ngamma delta\n").unwrap();

        let corpus = Corpus::from_file(file.path()).unwrap();
        assert_eq!(corpus.passages(), &["alpha beta", "gamma delta"]);
    }

    #[test]
    fn from_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = Corpus::from_file(dir.path().join("nope.txt"));

        assert_matches!(result, Err(CorpusError::Read { .. }));
    }

    #[test]
    fn choose_random_prompt_is_deterministic_for_a_seed() {
        let corpus = Corpus::embedded().unwrap();

        let a = choose_random_prompt(&corpus, &mut StdRng::seed_from_u64(7));
        let b = choose_random_prompt(&corpus, &mut StdRng::seed_from_u64(7));

        assert_eq!(a, b);
        assert!(corpus.passages().contains(&a));
    }

    #[test]
    fn choose_random_prompt_reaches_every_passage() {
        let corpus = Corpus::from_passages(["a", "b", "c"]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let seen = (0..200)
            .map(|_| choose_random_prompt(&corpus, &mut rng))
            .collect::<HashSet<String>>();

        assert_eq!(seen.len(), 3);
    }
}
