//! Event records and the field sets used to create and edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categoria::normalize_categoria;
use crate::error::{StoreError, StoreResult};
use crate::fecha::{format_fecha, parse_fecha};
use crate::time_of_day::{StoredTime, TimeOfDay};

/// Allowed `titulo` length in characters when edited.
pub const TITULO_MIN_CHARS: usize = 3;
pub const TITULO_MAX_CHARS: usize = 120;

/// A catalog event as persisted in the JSON store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub titulo: String,
    pub categoria: String,
    /// `dd/mm/yyyy`. Kept as text so older records with a bad date still load.
    pub fecha: String,
    #[serde(default)]
    pub hora_inicio: StoredTime,
    #[serde(default)]
    pub hora_fin: StoredTime,
    pub lugar: String,
    pub descripcion: String,
    pub creado_en: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actualizado_en: Option<DateTime<Utc>>,
}

/// Fields submitted to create an event. Every field is raw user input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub titulo: Option<String>,
    pub categoria: Option<String>,
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub lugar: Option<String>,
    pub descripcion: Option<String>,
}

/// Fields submitted to edit an event. Absent or blank fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    pub titulo: Option<String>,
    pub categoria: Option<String>,
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub lugar: Option<String>,
    pub descripcion: Option<String>,
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> StoreResult<&'a str> {
    present(value).ok_or_else(|| StoreError::missing(field))
}

fn validate_fecha(field: &'static str, value: &str) -> StoreResult<String> {
    parse_fecha(value).map(format_fecha).ok_or_else(|| {
        StoreError::invalid(field, format!("{field} must be a real date in dd/mm/yyyy format"))
    })
}

fn validate_hora(field: &'static str, value: &str) -> StoreResult<TimeOfDay> {
    TimeOfDay::parse(value).ok_or_else(|| {
        StoreError::invalid(field, format!("{field} must be HH:MM or hh:mm AM/PM"))
    })
}

fn validate_titulo(value: &str) -> StoreResult<String> {
    let chars = value.chars().count();
    if !(TITULO_MIN_CHARS..=TITULO_MAX_CHARS).contains(&chars) {
        return Err(StoreError::invalid(
            "titulo",
            format!(
                "titulo must be between {} and {} characters",
                TITULO_MIN_CHARS, TITULO_MAX_CHARS
            ),
        ));
    }
    Ok(value.to_string())
}

impl NewEvent {
    /// Validate the submitted fields and build the record to store.
    ///
    /// Fails on the first missing field in declaration order. `categoria` is
    /// never missing: blank or unknown values become the default category.
    pub fn into_event(self, id: String, creado_en: DateTime<Utc>) -> StoreResult<Event> {
        let titulo = required(&self.titulo, "titulo")?;
        let fecha = required(&self.fecha, "fecha")?;
        let hora_inicio = required(&self.hora_inicio, "hora_inicio")?;
        let hora_fin = required(&self.hora_fin, "hora_fin")?;
        let lugar = required(&self.lugar, "lugar")?;
        let descripcion = required(&self.descripcion, "descripcion")?;

        Ok(Event {
            id,
            titulo: titulo.to_string(),
            categoria: normalize_categoria(present(&self.categoria).unwrap_or_default()).to_string(),
            fecha: validate_fecha("fecha", fecha)?,
            hora_inicio: validate_hora("hora_inicio", hora_inicio)?.into(),
            hora_fin: validate_hora("hora_fin", hora_fin)?.into(),
            lugar: lugar.to_string(),
            descripcion: descripcion.to_string(),
            creado_en,
            actualizado_en: None,
        })
    }
}

/// Validated edits, ready to apply.
#[derive(Debug, Default)]
pub(crate) struct EventPatch {
    titulo: Option<String>,
    categoria: Option<&'static str>,
    fecha: Option<String>,
    hora_inicio: Option<TimeOfDay>,
    hora_fin: Option<TimeOfDay>,
    lugar: Option<String>,
    descripcion: Option<String>,
}

impl EventChanges {
    /// Validate every supplied field. Nothing is applied if any field fails.
    pub(crate) fn validate(&self) -> StoreResult<EventPatch> {
        Ok(EventPatch {
            titulo: present(&self.titulo).map(validate_titulo).transpose()?,
            categoria: present(&self.categoria).map(normalize_categoria),
            fecha: present(&self.fecha)
                .map(|v| validate_fecha("fecha", v))
                .transpose()?,
            hora_inicio: present(&self.hora_inicio)
                .map(|v| validate_hora("hora_inicio", v))
                .transpose()?,
            hora_fin: present(&self.hora_fin)
                .map(|v| validate_hora("hora_fin", v))
                .transpose()?,
            lugar: present(&self.lugar).map(String::from),
            descripcion: present(&self.descripcion).map(String::from),
        })
    }
}

impl EventPatch {
    pub(crate) fn apply_to(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(titulo) = self.titulo {
            event.titulo = titulo;
        }
        if let Some(categoria) = self.categoria {
            event.categoria = categoria.to_string();
        }
        if let Some(fecha) = self.fecha {
            event.fecha = fecha;
        }
        if let Some(hora_inicio) = self.hora_inicio {
            event.hora_inicio = hora_inicio.into();
        }
        if let Some(hora_fin) = self.hora_fin {
            event.hora_fin = hora_fin.into();
        }
        if let Some(lugar) = self.lugar {
            event.lugar = lugar;
        }
        if let Some(descripcion) = self.descripcion {
            event.descripcion = descripcion;
        }
        event.actualizado_en = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_new_event() -> NewEvent {
        NewEvent {
            titulo: Some("  Minga del parque ".to_string()),
            categoria: Some("minga".to_string()),
            fecha: Some("1/3/2024".to_string()),
            hora_inicio: Some("09:00 AM".to_string()),
            hora_fin: Some("13:30".to_string()),
            lugar: Some("Parque Central".to_string()),
            descripcion: Some("Limpieza comunitaria".to_string()),
        }
    }

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_into_event_normalizes_fields() {
        let event = make_new_event()
            .into_event("ev_1".to_string(), created_at())
            .unwrap();

        assert_eq!(event.titulo, "Minga del parque");
        assert_eq!(event.categoria, "Minga");
        assert_eq!(event.fecha, "01/03/2024");
        assert_eq!(event.hora_inicio.to_string(), "09:00");
        assert_eq!(event.hora_fin.to_string(), "13:30");
        assert_eq!(event.actualizado_en, None);
    }

    #[test]
    fn test_into_event_names_first_missing_field() {
        let mut fields = make_new_event();
        fields.hora_inicio = Some("   ".to_string());
        fields.lugar = None;

        let err = fields.into_event("ev_1".to_string(), created_at()).unwrap_err();
        assert_eq!(err.field(), Some("hora_inicio"));
    }

    #[test]
    fn test_into_event_blank_categoria_is_otro() {
        let mut fields = make_new_event();
        fields.categoria = Some(String::new());
        let event = fields.into_event("ev_1".to_string(), created_at()).unwrap();
        assert_eq!(event.categoria, "Otro");

        let mut fields = make_new_event();
        fields.categoria = None;
        let event = fields.into_event("ev_1".to_string(), created_at()).unwrap();
        assert_eq!(event.categoria, "Otro");
    }

    #[test]
    fn test_into_event_rejects_bad_date_and_time() {
        let mut fields = make_new_event();
        fields.fecha = Some("30/02/2024".to_string());
        let err = fields.into_event("ev_1".to_string(), created_at()).unwrap_err();
        assert_eq!(err.field(), Some("fecha"));

        let mut fields = make_new_event();
        fields.hora_fin = Some("25:00".to_string());
        let err = fields.into_event("ev_1".to_string(), created_at()).unwrap_err();
        assert_eq!(err.field(), Some("hora_fin"));
    }

    #[test]
    fn test_titulo_length_counts_characters() {
        assert!(validate_titulo("Añá").is_ok());
        assert!(validate_titulo("ab").is_err());
        assert!(validate_titulo(&"ó".repeat(120)).is_ok());
        assert!(validate_titulo(&"x".repeat(121)).is_err());
    }

    #[test]
    fn test_patch_touches_only_supplied_fields() {
        let mut event = make_new_event()
            .into_event("ev_1".to_string(), created_at())
            .unwrap();
        let before = event.clone();

        let changes = EventChanges {
            lugar: Some(" Plaza Norte ".to_string()),
            titulo: Some("".to_string()),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap();
        changes.validate().unwrap().apply_to(&mut event, now);

        assert_eq!(event.lugar, "Plaza Norte");
        assert_eq!(event.titulo, before.titulo);
        assert_eq!(event.fecha, before.fecha);
        assert_eq!(event.actualizado_en, Some(now));
    }

    #[test]
    fn test_event_json_field_names() {
        let event = make_new_event()
            .into_event("ev_1".to_string(), created_at())
            .unwrap();
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["hora_inicio"], "09:00");
        assert_eq!(value["creado_en"], "2024-02-01T12:00:00Z");
        assert!(value.get("actualizado_en").is_none());
    }
}
