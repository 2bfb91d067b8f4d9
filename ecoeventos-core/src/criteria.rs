//! Filter criteria for listing events.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::event::Event;
use crate::fecha::parse_fecha;

/// Optional, conjunctive filter. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Criteria {
    /// Case-insensitive exact match on `categoria`.
    pub categoria: Option<String>,
    /// Inclusive lower bound on `fecha` (`dd/mm/yyyy`).
    pub desde: Option<String>,
    /// Inclusive upper bound on `fecha` (`dd/mm/yyyy`).
    pub hasta: Option<String>,
    /// Case-insensitive substring of `lugar` or `titulo`.
    pub q: Option<String>,
}

/// Criteria with values parsed and lowercased once, ready to test records.
#[derive(Debug, Default)]
pub(crate) struct Matcher {
    categoria: Option<String>,
    desde: Option<NaiveDate>,
    hasta: Option<NaiveDate>,
    needle: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn date_bound(name: &str, value: &Option<String>) -> Option<NaiveDate> {
    let raw = non_blank(value)?;
    let date = parse_fecha(raw);
    if date.is_none() {
        tracing::debug!("Ignoring unparseable {} bound '{}'", name, raw);
    }
    date
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.categoria).is_none()
            && non_blank(&self.desde).is_none()
            && non_blank(&self.hasta).is_none()
            && non_blank(&self.q).is_none()
    }

    pub(crate) fn matcher(&self) -> Matcher {
        Matcher {
            categoria: non_blank(&self.categoria).map(str::to_lowercase),
            desde: date_bound("desde", &self.desde),
            hasta: date_bound("hasta", &self.hasta),
            needle: non_blank(&self.q).map(str::to_lowercase),
        }
    }
}

impl Matcher {
    pub(crate) fn matches(&self, event: &Event) -> bool {
        if let Some(categoria) = &self.categoria {
            if event.categoria.to_lowercase() != *categoria {
                return false;
            }
        }

        if self.desde.is_some() || self.hasta.is_some() {
            let Some(fecha) = parse_fecha(&event.fecha) else {
                return false;
            };
            if self.desde.is_some_and(|desde| fecha < desde) {
                return false;
            }
            if self.hasta.is_some_and(|hasta| fecha > hasta) {
                return false;
            }
        }

        if let Some(needle) = &self.needle {
            let in_lugar = event.lugar.to_lowercase().contains(needle.as_str());
            let in_titulo = event.titulo.to_lowercase().contains(needle.as_str());
            if !in_lugar && !in_titulo {
                return false;
            }
        }

        true
    }
}
