//! EventStore over a real JSON file.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use ecoeventos_core::storage::JsonFileStorage;
use ecoeventos_core::{Criteria, EventChanges, EventStore, NewEvent, StoreError};
use tempfile::TempDir;

fn new_event(titulo: &str, fecha: &str, lugar: &str) -> NewEvent {
    NewEvent {
        titulo: Some(titulo.to_string()),
        categoria: Some("Reciclaje".to_string()),
        fecha: Some(fecha.to_string()),
        hora_inicio: Some("08:00 AM".to_string()),
        hora_fin: Some("11:00".to_string()),
        lugar: Some(lugar.to_string()),
        descripcion: Some("Jornada de reciclaje".to_string()),
    }
}

fn open_store(path: &Path) -> EventStore {
    EventStore::new(JsonFileStorage::new(path))
}

#[test]
fn test_mutations_are_visible_to_a_fresh_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");

    let writer = open_store(&path);
    let created = writer
        .create(new_event("Reciclaje en el barrio", "20/04/2024", "Barrio Sur"))
        .unwrap();

    let reader = open_store(&path);
    assert_eq!(reader.get_by_id(&created.id), Some(created.clone()));

    let updated = writer
        .update_by_id(
            &created.id,
            EventChanges {
                lugar: Some("Barrio Norte".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(reader.get_by_id(&created.id), Some(updated));

    writer.delete_by_id(&created.id).unwrap();
    assert!(reader.list_all().is_empty());
}

#[test]
fn test_persisted_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    let store = open_store(&path);

    store
        .create(new_event("Sembratón", "01/06/2024", "Vereda El Salitre/Lote 3"))
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("[\n    {"));
    assert!(raw.contains("\"titulo\": \"Sembratón\""));
    assert!(raw.contains("Vereda El Salitre/Lote 3"));
    assert!(raw.contains("\"hora_inicio\": \"08:00\""));
    assert!(!raw.contains("actualizado_en"));

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    for field in [
        "id",
        "titulo",
        "categoria",
        "fecha",
        "hora_inicio",
        "hora_fin",
        "lugar",
        "descripcion",
        "creado_en",
    ] {
        assert!(record.get(field).is_some(), "missing {field}");
    }
}

#[test]
fn test_corrupt_file_heals_on_next_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    fs::write(&path, "[{\"id\": ").unwrap();

    let store = open_store(&path);
    assert!(store.list_all().is_empty());
    assert!(store.filter(&Criteria::default()).is_empty());

    store
        .create(new_event("Punto limpio", "10/10/2024", "Mercado"))
        .unwrap();
    assert_eq!(store.list_all().len(), 1);
}

#[test]
fn test_legacy_records_keep_bad_dates_out_of_range_filters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    fs::write(
        &path,
        r#"[
    {
        "id": "ev_legacy",
        "titulo": "Charla antigua",
        "categoria": "Charla",
        "fecha": "2024-03-10",
        "hora_inicio": "10:00 AM",
        "hora_fin": "11:00 AM",
        "lugar": "Auditorio",
        "descripcion": "Registro previo",
        "creado_en": "2024-01-05T09:00:00-05:00"
    }
]"#,
    )
    .unwrap();

    let store = open_store(&path);
    assert_eq!(store.list_all().len(), 1);

    let by_text = store.filter(&Criteria {
        q: Some("auditorio".to_string()),
        ..Default::default()
    });
    assert_eq!(by_text.len(), 1);

    let by_date = store.filter(&Criteria {
        hasta: Some("31/12/2030".to_string()),
        ..Default::default()
    });
    assert!(by_date.is_empty());
}

#[test]
fn test_records_with_missing_times_survive_unrelated_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    fs::write(
        &path,
        r#"[
    {
        "id": "ev_sin_fin",
        "titulo": "Caminata ecológica",
        "categoria": "Otro",
        "fecha": "05/06/2024",
        "hora_inicio": "07:00",
        "hora_fin": null,
        "lugar": "Cerro",
        "descripcion": "Sin hora de cierre",
        "creado_en": "2024-05-01T08:00:00-05:00"
    },
    {
        "id": "ev_sin_inicio",
        "titulo": "Feria verde",
        "categoria": "Feria",
        "fecha": "06/06/2024",
        "hora_inicio": "",
        "hora_fin": "05:00 PM",
        "lugar": "Plaza",
        "descripcion": "Hora por confirmar",
        "creado_en": "2024-05-02T08:00:00-05:00"
    }
]"#,
    )
    .unwrap();

    let store = open_store(&path);
    assert_eq!(store.list_all().len(), 2);
    let sin_fin = store.get_by_id("ev_sin_fin").unwrap();
    assert_eq!(sin_fin.hora_fin.time(), None);

    store
        .create(new_event("Reciclaje", "20/06/2024", "Barrio Sur"))
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 3);

    let by_id = |id: &str| records.iter().find(|r| r["id"] == id).unwrap();
    assert!(by_id("ev_sin_fin")["hora_fin"].is_null());
    assert_eq!(by_id("ev_sin_fin")["hora_inicio"], "07:00");
    assert_eq!(by_id("ev_sin_inicio")["hora_inicio"], "");
    assert_eq!(by_id("ev_sin_inicio")["hora_fin"], "17:00");
}

#[test]
fn test_concurrent_creates_are_all_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    let store = Arc::new(open_store(&path));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .create(new_event(&format!("Evento {n}"), "01/01/2025", "Plaza"))
                    .map(|e| e.id)
            })
        })
        .collect();

    let ids: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    let stored = store.list_all();
    assert_eq!(stored.len(), 8);
    for id in &ids {
        assert!(stored.iter().any(|e| &e.id == id));
    }
}

#[test]
fn test_concurrent_creates_from_separate_handles_are_all_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");

    // One store per caller, as with separate request handlers or processes.
    thread::scope(|scope| {
        for caller in 0..2 {
            let path = path.clone();
            scope.spawn(move || {
                let store = open_store(&path);
                for n in 0..10 {
                    store
                        .create(new_event(&format!("Evento {caller}-{n}"), "02/02/2025", "Parque"))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(open_store(&path).list_all().len(), 20);
}

#[test]
fn test_not_found_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("eventos.json");
    let store = open_store(&path);
    store
        .create(new_event("Reciclaje", "20/04/2024", "Barrio Sur"))
        .unwrap();
    let before = fs::read_to_string(&path).unwrap();

    assert!(matches!(
        store.delete_by_id("ev_missing"),
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}
