//! Render configuration and localized terms.

/// Localized strings used for generated section headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terms {
    pub footnotes: String,
    pub bibliography: String,
    pub index: String,
    /// Label of the normative bibliography group.
    pub normative: String,
    /// Label of the informative bibliography group.
    pub informative: String,
}

impl Default for Terms {
    fn default() -> Self {
        Self::for_language("en")
    }
}

impl Terms {
    /// Built-in terms for a BCP 47 language tag. Unknown tags get English.
    pub fn for_language(tag: &str) -> Self {
        let (footnotes, bibliography, index, normative, informative) =
            match tag.to_ascii_lowercase().as_str() {
                "nl" => ("Voetnoten", "Bibliografie", "Index", "Normatief", "Informatief"),
                "de" => ("Fußnoten", "Literaturverzeichnis", "Index", "Normativ", "Informativ"),
                "ja" => ("脚注", "参考文献", "索引", "規範的", "参考"),
                "zh-cn" => ("注释", "参考文献", "索引", "规范性", "资料性"),
                "zh-tw" => ("註釋", "參考文獻", "索引", "規範性", "資料性"),
                _ => ("Footnotes", "Bibliography", "Index", "Normative", "Informative"),
            };
        Self {
            footnotes: footnotes.to_string(),
            bibliography: bibliography.to_string(),
            index: index.to_string(),
            normative: normative.to_string(),
            informative: informative.to_string(),
        }
    }
}

/// Configuration for text layout.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Target line width in columns (0 means the default of 80).
    pub width: usize,
    /// Emit ANSI escape codes for emphasis, links and headings.
    pub ansi: bool,
    pub terms: Terms,
    /// Comment prefixes that may precede a `<<N>>` callout in code blocks.
    pub comments: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            ansi: false,
            terms: Terms::default(),
            comments: vec!["//".to_string(), "#".to_string()],
        }
    }
}

impl RenderConfig {
    pub const DEFAULT_WIDTH: usize = 80;

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_terms(mut self, terms: Terms) -> Self {
        self.terms = terms;
        self
    }

    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = comments.into_iter().map(Into::into).collect();
        self
    }

    /// The effective wrap width.
    pub fn text_width(&self) -> usize {
        if self.width == 0 {
            Self::DEFAULT_WIDTH
        } else {
            self.width
        }
    }
}
