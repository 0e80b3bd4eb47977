use serde::Serialize;

/// Raw value written on the right-hand side of `key=value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Quoted string or bare identifier
    Text(String),
    Integer(i64),
    Float(f64),
}

impl ArgValue {
    fn into_text(self, key: &str) -> Result<String, String> {
        match self {
            ArgValue::Text(s) => Ok(s),
            _ => Err(format!("Named argument '{}' expects a string", key)),
        }
    }

    fn into_number(self, key: &str) -> Result<f64, String> {
        match self {
            ArgValue::Integer(n) => Ok(n as f64),
            ArgValue::Float(n) => Ok(n),
            ArgValue::Text(_) => Err(format!("Named argument '{}' expects a number", key)),
        }
    }
}

/// Query language of an aggregation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLanguage {
    Kql,
    Lucene,
}

/// The closed set of named arguments a formula may use.
///
/// # Examples
/// ```text
/// count(kql='status:error')          // Kql
/// percentile(bytes, percentile=95)   // Percentile
/// sum(bytes, shift='1d')             // Shift
/// moving_average(avg(cpu), window=5) // Window
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum NamedArg {
    Field(String),
    Kql(String),
    Lucene(String),
    Percentile(f64),
    /// Rank value for `percentile_rank`
    Value(f64),
    Shift(String),
    ReducedTimeRange(String),
    /// Moving-average window size
    Window(u32),
    /// Normalization time unit
    Unit(String),
}

impl NamedArg {
    /// Type-check a written `key=value` pair.
    pub fn from_key_value(key: &str, value: ArgValue) -> Result<NamedArg, String> {
        Ok(match key {
            "field" => NamedArg::Field(value.into_text(key)?),
            "kql" => NamedArg::Kql(value.into_text(key)?),
            "lucene" => NamedArg::Lucene(value.into_text(key)?),
            "percentile" => NamedArg::Percentile(value.into_number(key)?),
            "value" => NamedArg::Value(value.into_number(key)?),
            "shift" => NamedArg::Shift(value.into_text(key)?),
            "reducedTimeRange" => NamedArg::ReducedTimeRange(value.into_text(key)?),
            "window" => match value {
                ArgValue::Integer(n) if n > 0 && n <= u32::MAX as i64 => NamedArg::Window(n as u32),
                _ => return Err("Named argument 'window' expects a positive integer".to_string()),
            },
            "unit" => NamedArg::Unit(value.into_text(key)?),
            _ => return Err(format!("Unknown named argument '{}'", key)),
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            NamedArg::Field(_) => "field",
            NamedArg::Kql(_) => "kql",
            NamedArg::Lucene(_) => "lucene",
            NamedArg::Percentile(_) => "percentile",
            NamedArg::Value(_) => "value",
            NamedArg::Shift(_) => "shift",
            NamedArg::ReducedTimeRange(_) => "reducedTimeRange",
            NamedArg::Window(_) => "window",
            NamedArg::Unit(_) => "unit",
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str) -> Result<(), String> {
    if slot.is_some() {
        return Err(format!("Argument '{}' given more than once", key));
    }
    *slot = Some(value);
    Ok(())
}

/// Arguments of an aggregation call after type-checking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationArgs {
    pub field: Option<String>,
    pub filter: Option<String>,
    pub filter_language: Option<FilterLanguage>,
    pub percentile: Option<f64>,
    pub rank_value: Option<f64>,
    pub time_shift: Option<String>,
    pub reduced_time_range: Option<String>,
}

impl AggregationArgs {
    /// Record the unlabeled field argument.
    pub fn set_field(&mut self, field: String) -> Result<(), String> {
        set_once(&mut self.field, field, "field")
    }

    pub fn apply(&mut self, arg: NamedArg) -> Result<(), String> {
        match arg {
            NamedArg::Field(field) => self.set_field(field),
            NamedArg::Kql(query) => self.set_filter(query, FilterLanguage::Kql),
            NamedArg::Lucene(query) => self.set_filter(query, FilterLanguage::Lucene),
            NamedArg::Percentile(n) => set_once(&mut self.percentile, n, "percentile"),
            NamedArg::Value(n) => set_once(&mut self.rank_value, n, "value"),
            NamedArg::Shift(s) => set_once(&mut self.time_shift, s, "shift"),
            NamedArg::ReducedTimeRange(s) => {
                set_once(&mut self.reduced_time_range, s, "reducedTimeRange")
            }
            other => Err(format!(
                "Named argument '{}' is not valid on an aggregation",
                other.key()
            )),
        }
    }

    fn set_filter(&mut self, query: String, language: FilterLanguage) -> Result<(), String> {
        if self.filter.is_some() {
            return Err("Only one of 'kql' or 'lucene' may be given".to_string());
        }
        self.filter = Some(query);
        self.filter_language = Some(language);
        Ok(())
    }
}

/// Arguments of a pipeline call after type-checking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineArgs {
    pub window: Option<u32>,
    pub unit: Option<String>,
}

impl PipelineArgs {
    pub fn apply(&mut self, arg: NamedArg) -> Result<(), String> {
        match arg {
            NamedArg::Window(n) => set_once(&mut self.window, n, "window"),
            NamedArg::Unit(s) => set_once(&mut self.unit, s, "unit"),
            other => Err(format!(
                "Named argument '{}' is not valid on a pipeline operation",
                other.key()
            )),
        }
    }
}
