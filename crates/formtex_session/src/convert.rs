//! The `convert` facade: formula text (plus optional highlights) in, LaTeX
//! out.

use std::collections::{BTreeMap, VecDeque};

use dashmap::DashMap;
use formtex_ast::Statement;
use formtex_formatter::{render, Color, HighlightConfig, HighlightError, LatexString};
use formtex_parser::{parse_formula, validate_latex, ParsedFormula};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::ConversionError;
use crate::options::{ConvertOptions, InputMode};

/// Subexpression text → color text (`red`, `#ff0000`).
///
/// Ordered, so conversions and cache keys do not depend on insertion order.
pub type ColorMap = BTreeMap<String, String>;

pub type ConversionResult = Result<LatexString, ConversionError>;

type CacheKey = (String, ColorMap);

/// Convert `text` with default options and no cache.
pub fn convert(text: &str, colors: &ColorMap) -> ConversionResult {
    convert_with(text, colors, &ConvertOptions::default())
}

/// Convert `text` under `options`. Pure: no state survives the call.
pub fn convert_with(text: &str, colors: &ColorMap, options: &ConvertOptions) -> ConversionResult {
    match options.mode {
        InputMode::Latex => {
            validate_latex(text, &options.dialect)?;
            debug!(len = text.len(), "latex passthrough");
            Ok(LatexString::plain(text))
        }
        InputMode::Formula => {
            let parsed = parse_formula(text, &options.dialect)?;
            let highlights = build_highlights(&parsed, colors, options)?;
            let latex = render(&parsed.context, &parsed.statement, &highlights);
            debug!(
                nodes = parsed.context.len(),
                highlighted = highlights.len(),
                packages = latex.packages().len(),
                "converted formula"
            );
            Ok(latex)
        }
    }
}

/// Resolve every color map entry against `parsed`, failing on the first
/// key that is invalid or absent.
fn build_highlights(
    parsed: &ParsedFormula,
    colors: &ColorMap,
    options: &ConvertOptions,
) -> Result<HighlightConfig, ConversionError> {
    let mut config = HighlightConfig::new();
    let roots = parsed.statement.roots();

    for (key, color_text) in colors {
        let color = Color::parse(color_text).map_err(|_| HighlightError::InvalidColor {
            key: key.clone(),
            color: color_text.clone(),
        })?;

        let pattern = parse_formula(key, &options.dialect).map_err(|err| {
            ConversionError::InvalidSubexpression {
                key: key.clone(),
                reason: err.to_string(),
            }
        })?;
        let Statement::Expression(pattern_root) = pattern.statement else {
            return Err(ConversionError::InvalidSubexpression {
                key: key.clone(),
                reason: "an equation cannot be highlighted".to_string(),
            });
        };

        let n = config.add_matches(
            &parsed.context,
            &roots,
            key,
            &pattern.context,
            pattern_root,
            &color,
        )?;
        trace!(key = %key, matches = n, "highlight resolved");
    }

    Ok(config)
}

/// A converter with fixed options and an optional memo cache.
///
/// Safe to share across threads. The cache holds at most
/// `options.cache_capacity` results and evicts the least recently used.
/// Concurrent misses on the same key may both compute; the results are
/// identical, so either insert is fine.
#[derive(Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
    cache: DashMap<CacheKey, ConversionResult>,
    /// Cached keys, least recently used first. Every cache insert and
    /// removal happens under this lock.
    order: Mutex<VecDeque<CacheKey>>,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            cache: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert, consulting the cache when enabled. Failures are cached too.
    pub fn convert(&self, text: &str, colors: &ColorMap) -> ConversionResult {
        if !self.options.cache || self.options.cache_capacity == 0 {
            return convert_with(text, colors, &self.options);
        }

        let key = (text.to_string(), colors.clone());
        let hit = self.cache.get(&key).map(|entry| entry.value().clone());
        if let Some(result) = hit {
            trace!("conversion cache hit");
            self.touch(&key);
            return result;
        }

        let result = convert_with(text, colors, &self.options);
        self.store(key, result.clone());
        result
    }

    /// Mark `key` as most recently used.
    fn touch(&self, key: &CacheKey) {
        let mut order = self.order.lock();
        if let Some(pos) = order.iter().position(|k| k == key) {
            if let Some(k) = order.remove(pos) {
                order.push_back(k);
            }
        }
    }

    /// Insert, evicting the oldest entries first so the cache never holds
    /// more than the capacity.
    fn store(&self, key: CacheKey, result: ConversionResult) {
        let mut order = self.order.lock();
        order.retain(|k| k != &key);
        while order.len() >= self.options.cache_capacity {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            self.cache.remove(&oldest);
            trace!("conversion cache eviction");
        }
        self.cache.insert(key.clone(), result);
        order.push_back(key);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        let mut order = self.order.lock();
        order.clear();
        self.cache.clear();
    }
}
