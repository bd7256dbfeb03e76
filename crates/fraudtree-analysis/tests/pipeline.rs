//! End-to-end pipeline: CSV source -> train -> store -> evaluate/predict.

use std::fmt::Write as _;
use std::path::Path;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

use fraudtree_analysis::{AnalysisService, ClassificationParams, IsolationParams, ParametersUsed};
use fraudtree_io::{CsvFeatureSource, EnsembleKind, ModelStore};

/// Write a labeled transaction table: 10% fraud with large amounts at odd
/// hours far from home, the rest small daytime purchases.
fn write_transactions(path: &Path, n: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut csv = String::from("trans_num,amt,distance_km,age,trans_hour,is_fraud,merchant\n");
    for i in 0..n {
        let fraud = i % 10 == 0;
        let (amt, dist, hour) = if fraud {
            (
                800.0 + rng.r#gen::<f64>() * 700.0,
                300.0 + rng.r#gen::<f64>() * 200.0,
                rng.gen_range(0u32..4),
            )
        } else {
            (
                5.0 + rng.r#gen::<f64>() * 95.0,
                rng.r#gen::<f64>() * 40.0,
                rng.gen_range(8u32..20),
            )
        };
        let age = 20.0 + rng.r#gen::<f64>() * 50.0;
        writeln!(
            csv,
            "tx{i:04},{amt:.2},{dist:.3},{age:.0},{hour},{},m{}",
            u8::from(fraud),
            i % 13
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn service(dir: &TempDir, n: usize) -> AnalysisService<CsvFeatureSource> {
    let csv_path = dir.path().join("transactions.csv");
    write_transactions(&csv_path, n);
    AnalysisService::new(
        CsvFeatureSource::new(&csv_path),
        ModelStore::new(dir.path().join("models")),
    )
}

#[test]
fn classification_train_evaluate_predict() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir, 500);

    let params = ClassificationParams {
        n_trees: 30,
        max_depth: 6,
        ..ClassificationParams::default()
    };
    let trained = svc.train_classifier(&params).unwrap();
    assert!(svc.store().contains(EnsembleKind::Classification));
    assert_eq!(trained.data_points, 500);
    assert!(trained.accuracy >= 0.99, "accuracy {}", trained.accuracy);
    assert_eq!(
        trained.confusion_matrix.tp + trained.confusion_matrix.fn_,
        50
    );

    let ParametersUsed::Classification(used) = &trained.parameters_used else {
        panic!("expected classification parameters");
    };
    assert_eq!(used.feature_subset_size, Some(2));
    assert_eq!(used.sample_size, Some(500));

    let evaluated = svc.evaluate_classifier().unwrap();
    assert_eq!(evaluated.confusion_matrix, trained.confusion_matrix);
    assert_eq!(evaluated.flagged_records, trained.flagged_records);

    assert_eq!(svc.predict_single(&[1200.0, 400.0, 35.0, 2.0]).unwrap(), 1);
    assert_eq!(svc.predict_single(&[20.0, 5.0, 35.0, 13.0]).unwrap(), 0);
    assert_eq!(
        svc.predict_batch(&[vec![1200.0, 400.0, 35.0, 2.0], vec![20.0, 5.0, 35.0, 13.0]])
            .unwrap(),
        vec![1, 0]
    );
    assert!(svc.predict_single(&[1.0, 2.0]).is_err());
}

#[test]
fn isolation_train_then_reevaluate() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir, 1000);

    let params = IsolationParams {
        tree_count: 80,
        threshold: 0.55,
        ..IsolationParams::default()
    };
    let trained = svc.train_isolation(&params).unwrap();
    assert!(trained.model_save_status.is_some());
    assert!(trained.recall > 0.5, "recall {}", trained.recall);

    // Metadata travels with each record untouched.
    let first = trained
        .flagged_records
        .iter()
        .chain(&trained.unflagged_records)
        .find(|r| r.index == 0)
        .unwrap();
    assert_eq!(first.metadata.get("trans_num"), Some("tx0000"));
    assert_eq!(first.metadata.get("merchant"), Some("m0"));

    let again = svc.evaluate_isolation(None).unwrap();
    assert_eq!(again.flagged_count, trained.flagged_count);
    let scores = |m: &fraudtree_analysis::Metrics| -> Vec<u64> {
        let mut all: Vec<_> = m.flagged_records.iter().chain(&m.unflagged_records).collect();
        all.sort_by_key(|r| r.index);
        all.iter().map(|r| r.score.unwrap().to_bits()).collect()
    };
    assert_eq!(scores(&again), scores(&trained));

    let lenient = svc.evaluate_isolation(Some(0.3)).unwrap();
    assert!(lenient.flagged_count >= again.flagged_count);
}

#[test]
fn retraining_overwrites_stored_model() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir, 200);

    svc.train_classifier(&ClassificationParams {
        n_trees: 5,
        ..ClassificationParams::default()
    })
    .unwrap();
    svc.train_classifier(&ClassificationParams {
        n_trees: 9,
        ..ClassificationParams::default()
    })
    .unwrap();

    let ParametersUsed::Classification(used) = svc.evaluate_classifier().unwrap().parameters_used
    else {
        panic!("expected classification parameters");
    };
    assert_eq!(used.n_trees, 9);
}
