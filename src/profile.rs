use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RagError;

/// Retrieval backend selected by a profile's `program` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    Tfidf,
    Distllm,
    CorpusSearch,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::Distllm, Program::Tfidf, Program::CorpusSearch];

    pub fn as_str(self) -> &'static str {
        match self {
            Program::Tfidf => "tfidf",
            Program::Distllm => "distllm",
            Program::CorpusSearch => "corpusSearch",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "tfidf" => Some(Program::Tfidf),
            "distllm" => Some(Program::Distllm),
            "corpusSearch" | "corpus_search" => Some(Program::CorpusSearch),
            _ => None,
        }
    }

    /// Caller-facing message used when this backend fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Program::Tfidf => "Failed to process TF-IDF RAG request",
            Program::Distllm => "Failed to process distLLM RAG request",
            Program::CorpusSearch => "Failed to process corpus search RAG request",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A profile record exactly as stored, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Corpus id this record belongs to.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ProfileRecord {
    pub fn new(program: &str, data: Value) -> Self {
        Self {
            name: String::new(),
            program: Some(program.to_string()),
            data: match data {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    fn program_tag(&self) -> String {
        self.program.clone().unwrap_or_else(|| "default".to_string())
    }

    /// Look up a mandatory string field under either of its spellings.
    fn required(&self, program: Program, snake: &str, camel: &str) -> Result<String, RagError> {
        self.data
            .get(snake)
            .or_else(|| self.data.get(camel))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                RagError::configuration(format!(
                    "{snake} not found in {program} rag configuration"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TfidfData {
    pub embeddings_path: String,
    pub vectorizer_path: String,
}

impl TfidfData {
    fn from_record(record: &ProfileRecord) -> Result<Self, RagError> {
        Ok(Self {
            embeddings_path: record.required(Program::Tfidf, "embeddings_path", "embeddingsPath")?,
            vectorizer_path: record.required(Program::Tfidf, "vectorizer_path", "vectorizerPath")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistllmData {
    pub dataset_dir: String,
    pub faiss_index_path: String,
}

impl DistllmData {
    fn from_record(record: &ProfileRecord) -> Result<Self, RagError> {
        Ok(Self {
            dataset_dir: record.required(Program::Distllm, "dataset_dir", "datasetDir")?,
            faiss_index_path: record.required(
                Program::Distllm,
                "faiss_index_path",
                "faissIndexPath",
            )?,
        })
    }
}

/// A validated profile: the variant fixes which `data` keys exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalProfile {
    Tfidf(TfidfData),
    Distllm(DistllmData),
    CorpusSearch,
}

impl RetrievalProfile {
    pub fn program(&self) -> Program {
        match self {
            RetrievalProfile::Tfidf(_) => Program::Tfidf,
            RetrievalProfile::Distllm(_) => Program::Distllm,
            RetrievalProfile::CorpusSearch => Program::CorpusSearch,
        }
    }

    pub fn from_record(record: &ProfileRecord) -> Result<Self, RagError> {
        let program = match record.program.as_deref() {
            Some(tag) => {
                Program::parse(tag).ok_or_else(|| RagError::UnknownProgram(Some(tag.into())))?
            }
            None => return Err(RagError::UnknownProgram(None)),
        };
        Ok(match program {
            Program::Tfidf => RetrievalProfile::Tfidf(TfidfData::from_record(record)?),
            Program::Distllm => RetrievalProfile::Distllm(DistllmData::from_record(record)?),
            Program::CorpusSearch => RetrievalProfile::CorpusSearch,
        })
    }
}

/// Exactly one tfidf and one distllm profile, tfidf always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualProfileSet {
    pub tfidf: TfidfData,
    pub distllm: DistllmData,
}

impl DualProfileSet {
    pub fn from_records(first: &ProfileRecord, second: &ProfileRecord) -> Result<Self, RagError> {
        let tags = [first.program_tag(), second.program_tag()];
        let invalid = || {
            RagError::configuration(format!(
                "Multi-RAG handler requires one 'tfidf' and one 'distllm' configuration, \
                 but got programs: {tags:?}"
            ))
        };

        let programs = [
            Program::parse(&tags[0]).ok_or_else(invalid)?,
            Program::parse(&tags[1]).ok_or_else(invalid)?,
        ];
        let (tfidf_record, distllm_record) = match programs {
            [Program::Tfidf, Program::Distllm] => (first, second),
            [Program::Distllm, Program::Tfidf] => (second, first),
            _ => return Err(invalid()),
        };

        let tfidf = TfidfData::from_record(tfidf_record)?;
        let distllm = DistllmData::from_record(distllm_record)?;

        Ok(Self { tfidf, distllm })
    }
}

/// Outcome of classifying the records resolved for one corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSet {
    Single(RetrievalProfile),
    Dual(DualProfileSet),
}

impl ProfileSet {
    /// Classify by count: none is an error, one routes directly, exactly two
    /// fuse, anything more is rejected.
    pub fn classify(corpus_id: &str, records: &[ProfileRecord]) -> Result<Self, RagError> {
        match records {
            [] => Err(RagError::configuration(format!(
                "No RAG configurations found for database '{corpus_id}'"
            ))),
            [single] => Ok(ProfileSet::Single(RetrievalProfile::from_record(single)?)),
            [first, second] => Ok(ProfileSet::Dual(DualProfileSet::from_records(
                first, second,
            )?)),
            more => Err(RagError::configuration(format!(
                "multi-rag requires exactly 2 configurations, but got {}",
                more.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tfidf_record() -> ProfileRecord {
        ProfileRecord::new(
            "tfidf",
            json!({ "embeddings_path": "/e", "vectorizer_path": "/v" }),
        )
    }

    fn distllm_record() -> ProfileRecord {
        ProfileRecord::new(
            "distllm",
            json!({ "datasetDir": "/d", "faissIndexPath": "/f" }),
        )
    }

    #[test]
    fn test_program_tags_round_trip() {
        for program in Program::ALL {
            assert_eq!(Program::parse(program.as_str()), Some(program));
            assert_eq!(program.to_string(), program.as_str());
        }
    }

    #[test]
    fn test_program_parse_accepts_both_corpus_search_spellings() {
        assert_eq!(Program::parse("corpusSearch"), Some(Program::CorpusSearch));
        assert_eq!(Program::parse("corpus_search"), Some(Program::CorpusSearch));
        assert_eq!(Program::parse("chroma"), None);
        assert_eq!(Program::parse("TFIDF"), None);
    }

    #[test]
    fn test_from_record_tfidf() {
        let profile = RetrievalProfile::from_record(&tfidf_record()).unwrap();
        assert_eq!(
            profile,
            RetrievalProfile::Tfidf(TfidfData {
                embeddings_path: "/e".into(),
                vectorizer_path: "/v".into(),
            })
        );
    }

    #[test]
    fn test_from_record_camel_case_keys() {
        let profile = RetrievalProfile::from_record(&distllm_record()).unwrap();
        assert_eq!(profile.program(), Program::Distllm);
    }

    #[test]
    fn test_from_record_missing_key_is_configuration_error() {
        let record = ProfileRecord::new("distllm", json!({ "dataset_dir": "/d" }));
        let err = RetrievalProfile::from_record(&record).unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
        assert!(err.to_string().contains("faiss_index_path"));
    }

    #[test]
    fn test_from_record_unknown_and_absent_program() {
        let unknown = ProfileRecord::new("chroma", json!({}));
        assert!(matches!(
            RetrievalProfile::from_record(&unknown),
            Err(RagError::UnknownProgram(Some(_)))
        ));

        let absent = ProfileRecord::default();
        assert!(matches!(
            RetrievalProfile::from_record(&absent),
            Err(RagError::UnknownProgram(None))
        ));
    }

    #[test]
    fn test_corpus_search_needs_no_data() {
        let record = ProfileRecord::new("corpus_search", json!({}));
        assert_eq!(
            RetrievalProfile::from_record(&record).unwrap(),
            RetrievalProfile::CorpusSearch
        );
    }

    #[test]
    fn test_dual_set_is_order_independent() {
        let a = DualProfileSet::from_records(&tfidf_record(), &distllm_record()).unwrap();
        let b = DualProfileSet::from_records(&distllm_record(), &tfidf_record()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tfidf.vectorizer_path, "/v");
        assert_eq!(a.distllm.dataset_dir, "/d");
    }

    #[test]
    fn test_dual_set_rejects_other_pairs() {
        let corpus = ProfileRecord::new("corpusSearch", json!({}));
        let unknown = ProfileRecord::new("chroma", json!({}));
        let pairs = [
            (tfidf_record(), tfidf_record()),
            (distllm_record(), distllm_record()),
            (tfidf_record(), corpus.clone()),
            (corpus, distllm_record()),
            (unknown, tfidf_record()),
            (ProfileRecord::default(), distllm_record()),
        ];
        for (a, b) in &pairs {
            let err = DualProfileSet::from_records(a, b).unwrap_err();
            assert!(matches!(err, RagError::Configuration(_)), "{a:?} / {b:?}");
            let err = DualProfileSet::from_records(b, a).unwrap_err();
            assert!(matches!(err, RagError::Configuration(_)), "{b:?} / {a:?}");
        }
    }

    #[test]
    fn test_classify_by_count() {
        let err = ProfileSet::classify("papers", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No RAG configurations found for database 'papers'"
        );

        let single = ProfileSet::classify("papers", &[tfidf_record()]).unwrap();
        assert!(matches!(single, ProfileSet::Single(RetrievalProfile::Tfidf(_))));

        let dual = ProfileSet::classify("papers", &[distllm_record(), tfidf_record()]).unwrap();
        assert!(matches!(dual, ProfileSet::Dual(_)));

        let err = ProfileSet::classify(
            "papers",
            &[tfidf_record(), distllm_record(), tfidf_record()],
        )
        .unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));
        assert!(err
            .to_string()
            .contains("requires exactly 2 configurations, but got 3"));
    }

    #[test]
    fn test_dual_set_validates_data() {
        let bad = ProfileRecord::new("tfidf", json!({ "embeddings_path": "/e" }));
        let err = DualProfileSet::from_records(&bad, &distllm_record()).unwrap_err();
        assert!(err.to_string().contains("vectorizer_path"));
    }
}
