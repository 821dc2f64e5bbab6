use report::{AnalysisModule, History, ReportError};

#[test]
fn saves_and_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.toml");

    let mut history = History::new(20);
    history.push(AnalysisModule::Routine, "plan my week", "1. Plan\nA | B\n--|--\n1 | 2");
    history.push(AnalysisModule::Message, "what did \"ok\" mean?", "1. Meaning\n*fine*");
    history.save(&path).unwrap();

    let loaded = History::load(&path, 20).unwrap();
    assert_eq!(loaded, history);
    assert_eq!(loaded.entries()[0].module, AnalysisModule::Message);
    assert_eq!(loaded.entries()[1].result, "1. Plan\nA | B\n--|--\n1 | 2");
}

#[test]
fn smaller_limit_on_load_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.toml");

    let mut history = History::new(20);
    for i in 0..5 {
        history.push(AnalysisModule::Glossary, &format!("phrase {}", i), "r");
    }
    history.save(&path).unwrap();

    let loaded = History::load(&path, 3).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.entries()[0].input, "phrase 4");
}

#[test]
fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = History::load(&dir.path().join("absent.toml"), 20).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn garbage_file_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.toml");
    std::fs::write(&path, "entries = 3").unwrap();

    let err = History::load(&path, 20).unwrap_err();
    assert!(matches!(err, ReportError::HistoryDecode { .. }));
}

#[test]
fn zero_limit_on_load_keeps_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.toml");

    let mut history = History::new(20);
    history.push(AnalysisModule::Audio, "older", "r");
    history.push(AnalysisModule::Audio, "newer", "r");
    history.save(&path).unwrap();

    let mut loaded = History::load(&path, 0).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.entries()[0].input, "newer");

    loaded.push(AnalysisModule::Decoder, "latest", "r");
    assert_eq!(loaded.entries()[0].input, "latest");
    assert_eq!(loaded.len(), 1);
}
