use crate::extract::{extract_main, ContentBounds, ExtractCfg};
use crate::rank::rank_keywords;
use crate::segment::{DictSegmenter, Dictionary};
use crate::stopwords::StopwordSet;
use serde::Serialize;
use soso_core::{AnalyzerConfig, Keyword, Result, Segmenter, Token};
use std::sync::Arc;

/// One analyzed page.
///
/// The segmenter is shared (dictionary loading is the expensive step); the stopword set and
/// every analysis output are owned by this document.
pub struct Document {
    segmenter: Arc<dyn Segmenter>,
    stopwords: StopwordSet,
    cfg: ExtractCfg,
    /// Warnings about the resources themselves; they survive `load_html`.
    resource_warnings: Vec<&'static str>,

    title: String,
    main_content: String,
    bounds: Option<ContentBounds>,
    word_count: usize,
    keywords: Vec<Keyword>,
    warnings: Vec<&'static str>,
}

/// Serializable view of a document's analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary<'a> {
    pub title: &'a str,
    pub main_content: &'a str,
    pub word_count: usize,
    pub keywords: &'a [Keyword],
    pub warnings: &'a [&'static str],
}

impl Document {
    pub fn new(segmenter: Arc<dyn Segmenter>, stopwords: StopwordSet) -> Self {
        Self {
            segmenter,
            stopwords,
            cfg: ExtractCfg::default(),
            resource_warnings: Vec::new(),
            title: String::new(),
            main_content: String::new(),
            bounds: None,
            word_count: 0,
            keywords: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Load both resources from `cfg`.
    ///
    /// `dictionary_path` may name several comma-separated files. A dictionary that cannot be
    /// loaded is an error. A missing stopword list is not: the document falls back to an empty
    /// set and records a warning.
    pub fn open(cfg: &AnalyzerConfig) -> Result<Self> {
        let dict = Dictionary::from_config(cfg)?;
        let segmenter: Arc<dyn Segmenter> = Arc::new(DictSegmenter::new(dict));
        Ok(Self::with_stopwords_path(segmenter, cfg))
    }

    /// Share an already-loaded segmenter; only the stopword list is read from `cfg`.
    pub fn with_stopwords_path(segmenter: Arc<dyn Segmenter>, cfg: &AnalyzerConfig) -> Self {
        let (stopwords, warning) = StopwordSet::load_or_empty(cfg.stopwords_path.as_deref());
        let mut doc = Self::new(segmenter, stopwords);
        if let Some(w) = warning {
            doc.add_resource_warning(w);
        }
        doc
    }

    /// Record a degraded-resource signal; unlike analysis warnings it survives `load_html`.
    pub fn add_resource_warning(&mut self, warning: &'static str) {
        self.resource_warnings.push(warning);
        self.warnings.push(warning);
    }

    pub fn with_extract_cfg(mut self, cfg: ExtractCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Run the pipeline: main content → segmentation → keyword ranking.
    ///
    /// Replaces every output of a previous call; identical input yields identical output.
    pub fn load_html(&mut self, html: &str) {
        let main = extract_main(html, &self.cfg);
        let tokens = self.segmenter.segment(&main.text);

        self.word_count = tokens.len();
        self.keywords = rank_keywords(&tokens, &self.stopwords);
        self.title = main.title;
        self.main_content = main.text;
        self.bounds = Some(main.bounds);
        self.warnings = self.resource_warnings.clone();
        self.warnings.extend(main.warnings);

        tracing::debug!(
            segmenter = self.segmenter.name(),
            word_count = self.word_count,
            keywords = self.keywords.len(),
            "analyzed document"
        );
    }

    /// Segmentation of the current main content (unfiltered).
    pub fn words(&self) -> Vec<Token> {
        self.segmenter.segment(&self.main_content)
    }

    pub fn total_frequency(&self) -> u64 {
        self.segmenter.total_frequency()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn main_content(&self) -> &str {
        &self.main_content
    }

    pub fn bounds(&self) -> Option<ContentBounds> {
        self.bounds
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn warnings(&self) -> &[&'static str] {
        &self.warnings
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn summary(&self) -> DocumentSummary<'_> {
        DocumentSummary {
            title: &self.title,
            main_content: &self.main_content,
            word_count: self.word_count,
            keywords: &self.keywords,
            warnings: &self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::counted_tokens;
    use soso_core::{Error, Position};
    use std::io::Write;
    use std::path::PathBuf;

    const SCENARIO_HTML: &str =
        "<html><head><title>Test</title></head><body>AAAA BBBB AAAA CCCC</body></html>";

    fn segmenter() -> Arc<dyn Segmenter> {
        Arc::new(DictSegmenter::new(Dictionary::parse("AAAA 10\nBBBB 5\nCCCC 2\n")))
    }

    fn scenario_doc() -> Document {
        let stop: StopwordSet = ["BBBB"].into_iter().collect();
        let mut doc = Document::new(segmenter(), stop);
        doc.load_html(SCENARIO_HTML);
        doc
    }

    #[test]
    fn scenario_ranks_body_terms_after_the_title_row() {
        let doc = scenario_doc();
        assert_eq!(doc.main_content(), "Test \nAAAA BBBB AAAA CCCC\n");
        assert_eq!(doc.title(), "Test \n");

        let kws = doc.keywords();
        let order: Vec<&str> = kws.iter().map(|k| k.text.as_str()).collect();
        assert_eq!(order, vec!["AAAA", "Test", "CCCC"]);

        // The title line is row 1, so the body line is row 2.
        assert_eq!(kws[0].count, 2);
        assert_eq!(kws[0].positions, vec![Position::new(2, 1), Position::new(2, 2)]);
        assert_eq!(kws[0].token.frequency, 10);
        assert_eq!(kws[2].positions, vec![Position::new(2, 3)]);
        assert!(kws.iter().all(|k| k.text != "BBBB"));
    }

    #[test]
    fn word_count_includes_every_token() {
        let doc = scenario_doc();
        // Test, " ", "\n", AAAA, " ", BBBB, " ", AAAA, " ", CCCC, "\n"
        assert_eq!(doc.word_count(), 11);
        assert_eq!(doc.word_count(), doc.words().len());

        let total: usize = doc.keywords().iter().map(|k| k.count).sum();
        assert_eq!(total, counted_tokens(&doc.words(), doc.stopwords()));
    }

    #[test]
    fn load_html_is_idempotent() {
        let mut doc = scenario_doc();
        let main = doc.main_content().to_string();
        let words = doc.word_count();
        let kws = doc.keywords().to_vec();

        doc.load_html(SCENARIO_HTML);
        assert_eq!(doc.main_content(), main);
        assert_eq!(doc.word_count(), words);
        assert_eq!(doc.keywords(), kws.as_slice());
    }

    #[test]
    fn missing_stopwords_makes_every_token_a_candidate() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let cfg = AnalyzerConfig {
            dictionary_path: None,
            stopwords_path: Some(dir.path().join("missing-stopwords.txt")),
        };
        let mut doc = Document::with_stopwords_path(segmenter(), &cfg);
        assert_eq!(doc.warnings(), &["stopwords_unavailable"]);

        doc.load_html(SCENARIO_HTML);
        assert!(doc.keywords().iter().any(|k| k.text == "BBBB"));
        // The resource warning survives a reload.
        assert_eq!(doc.warnings(), &["stopwords_unavailable"]);
    }

    #[test]
    fn extract_cfg_can_force_whole_document_fallback() {
        let mut doc = Document::new(segmenter(), StopwordSet::empty()).with_extract_cfg(
            ExtractCfg {
                window_lines: 5,
                density_threshold: 1.0,
            },
        );
        doc.load_html(SCENARIO_HTML);
        assert_eq!(doc.bounds().map(|b| b.fallback), Some(true));
        assert_eq!(doc.warnings(), &["density_fallback_whole_document"]);
        assert_eq!(doc.main_content(), "Test \nAAAA BBBB AAAA CCCC\n");
    }

    #[test]
    fn open_requires_a_loadable_dictionary() {
        let err = Document::open(&AnalyzerConfig::default()).err();
        assert!(matches!(err, Some(Error::NotConfigured(_))));

        let cfg = AnalyzerConfig {
            dictionary_path: Some(PathBuf::from("/definitely/not/here/dict.txt")),
            stopwords_path: None,
        };
        assert!(matches!(Document::open(&cfg).err(), Some(Error::Dictionary(_))));
    }

    #[test]
    fn open_loads_dictionary_and_stopwords_from_files() {
        let mut dict = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(dict, "搜索 40 v").expect("write");
        writeln!(dict, "引擎 30 n").expect("write");
        let mut stop = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(stop, "的").expect("write");

        let cfg = AnalyzerConfig {
            dictionary_path: Some(dict.path().to_path_buf()),
            stopwords_path: Some(stop.path().to_path_buf()),
        };
        let mut doc = Document::open(&cfg).expect("open");
        assert_eq!(doc.total_frequency(), 70);
        assert!(doc.warnings().is_empty());

        doc.load_html("<head><title>搜索</title></head><p>搜索的引擎</p>");
        let kws = doc.keywords();
        assert_eq!(kws[0].text, "搜索");
        assert_eq!(kws[0].count, 2);
        assert!(kws.iter().all(|k| k.text != "的"));
    }

    #[test]
    fn open_accepts_a_comma_separated_dictionary_list() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "AAAA 10\n").expect("write");
        std::fs::write(&b, "CCCC 2\n").expect("write");

        let cfg = AnalyzerConfig {
            dictionary_path: Some(PathBuf::from(format!("{},{}", a.display(), b.display()))),
            stopwords_path: None,
        };
        let mut doc = Document::open(&cfg).expect("open list");
        assert_eq!(doc.total_frequency(), 12);
        assert_eq!(doc.warnings(), &["stopwords_not_configured"]);

        doc.load_html(SCENARIO_HTML);
        let cccc = doc.keywords().iter().find(|k| k.text == "CCCC").map(|k| k.token.frequency);
        assert_eq!(cccc, Some(2));
    }

    #[test]
    fn shared_segmenter_serves_independent_documents() {
        let shared = segmenter();
        let mut a = Document::new(Arc::clone(&shared), StopwordSet::empty());
        let mut b = Document::new(shared, ["AAAA"].into_iter().collect());
        a.load_html(SCENARIO_HTML);
        b.load_html(SCENARIO_HTML);
        assert!(a.keywords().iter().any(|k| k.text == "AAAA"));
        assert!(b.keywords().iter().all(|k| k.text != "AAAA"));
        assert_eq!(a.word_count(), b.word_count());
    }

    #[test]
    fn summary_serializes_output_fields() {
        let doc = scenario_doc();
        let v = serde_json::to_value(doc.summary()).expect("json");
        assert_eq!(v["word_count"].as_u64(), Some(11));
        assert_eq!(v["keywords"][0]["text"].as_str(), Some("AAAA"));
        assert_eq!(v["keywords"][0]["positions"][0]["row"].as_u64(), Some(2));
        assert!(v["main_content"].as_str().unwrap_or("").starts_with("Test \n"));
    }
}
