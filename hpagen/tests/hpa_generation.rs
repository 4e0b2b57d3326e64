use hpagen::{generate, load, ArtifactWriter, ErrorKind, HpaHandler};
use kube::ResourceExt;
use models::autoscaler::PodAutoscalerModel;
use models::constants::KUBERNETES_SELECTOR_KEY;
use models::deployment::DeploymentModel;
use models::store::ModelStore;

use std::fs;
use std::path::Path;

const HPA_NAME: &str = "MyHPA";
const DEPLOYMENT_NAME: &str = "MyDeployment";
const SELECTOR: &str = "hello";
const CPU_PERCENTAGE: i32 = 90;
const MAX_REPLICAS: i32 = 10;
const MIN_REPLICAS: i32 = 2;

fn hello_store(output_dir: &Path) -> ModelStore {
    let deployment = DeploymentModel::builder()
        .name(DEPLOYMENT_NAME)
        .ports([9090, 9091, 9092])
        .label(KUBERNETES_SELECTOR_KEY, SELECTOR)
        .single_yaml(false)
        .build()
        .unwrap();
    let autoscaler = PodAutoscalerModel::builder()
        .name(HPA_NAME)
        .cpu_percentage(CPU_PERCENTAGE)
        .max_replicas(MAX_REPLICAS)
        .min_replicas(MIN_REPLICAS)
        .deployment(DEPLOYMENT_NAME)
        .label(KUBERNETES_SELECTOR_KEY, SELECTOR)
        .build()
        .unwrap();

    let mut store = ModelStore::new().with_output_dir(output_dir);
    store.add_deployment(deployment).unwrap();
    store.attach_autoscaler(autoscaler).unwrap();
    store
}

#[test]
fn test_hpa_generate() {
    let dir = tempfile::tempdir().unwrap();
    let store = hello_store(dir.path());

    let written = HpaHandler::new(&store).create_artifacts().unwrap();

    let path = dir.path().join("hello_hpa.yaml");
    assert_eq!(written, vec![path.clone()]);
    assert!(path.exists());

    let hpa = load(&path).unwrap();
    assert_eq!(hpa.name_any(), HPA_NAME);
    assert_eq!(
        hpa.labels().get(KUBERNETES_SELECTOR_KEY).map(String::as_str),
        Some(SELECTOR)
    );
    let spec = hpa.spec.unwrap();
    assert_eq!(spec.max_replicas, MAX_REPLICAS);
    assert_eq!(spec.min_replicas, Some(MIN_REPLICAS));
    let metrics = spec.metrics.unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(
        metrics[0].resource.as_ref().unwrap().target.average_utilization,
        Some(CPU_PERCENTAGE)
    );
    assert_eq!(spec.scale_target_ref.name, DEPLOYMENT_NAME);
}

// Pins the exact manifest written for the hello workload. After an intended change to the
// generated YAML, accept the new snapshot with `cargo insta review`.
#[test]
fn test_hpa_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = hello_store(dir.path());

    let path = HpaHandler::new(&store).create_artifacts().unwrap().remove(0);
    let content = fs::read_to_string(path).unwrap();

    insta::assert_snapshot!("hello_hpa", content);
}

#[test]
fn test_generation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = hello_store(dir.path());
    let handler = HpaHandler::new(&store);

    let path = handler.create_artifacts().unwrap().remove(0);
    let first = fs::read(&path).unwrap();
    handler.create_artifacts().unwrap();

    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn test_invalid_utilization_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = hello_store(dir.path());
    let deployment = store.deployment(DEPLOYMENT_NAME).unwrap();

    for cpu_percentage in [0, 101] {
        let autoscaler = PodAutoscalerModel {
            cpu_percentage,
            ..store.autoscaler_for(DEPLOYMENT_NAME).unwrap().clone()
        };
        let err = generate(deployment, Some(&autoscaler)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generation);
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unscaled_deployment_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ModelStore::new().with_output_dir(dir.path());
    store
        .add_deployment(
            DeploymentModel::builder()
                .name(DEPLOYMENT_NAME)
                .label(KUBERNETES_SELECTOR_KEY, SELECTOR)
                .build()
                .unwrap(),
        )
        .unwrap();

    assert!(HpaHandler::new(&store).create_artifacts().unwrap().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_parallel_generation_of_distinct_workloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ModelStore::new().with_output_dir(dir.path());
    let selectors: Vec<String> = (0..8).map(|i| format!("app-{}", i)).collect();
    for (i, selector) in selectors.iter().enumerate() {
        store
            .add_deployment(
                DeploymentModel::builder()
                    .name(format!("deployment-{}", i))
                    .label(KUBERNETES_SELECTOR_KEY, selector.as_str())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        store
            .attach_autoscaler(
                PodAutoscalerModel::builder()
                    .name(format!("hpa-{}", i))
                    .deployment(format!("deployment-{}", i))
                    .cpu_percentage(10 + i as i32)
                    .min_replicas(1)
                    .max_replicas(3)
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }

    let store = &store;
    std::thread::scope(|scope| {
        for (deployment, autoscaler) in store.autoscaled() {
            scope.spawn(move || {
                let hpa = generate(deployment, Some(autoscaler)).unwrap().unwrap();
                ArtifactWriter::new(store.output_dir())
                    .write(&hpa, deployment.selector().unwrap())
                    .unwrap();
            });
        }
    });

    for (i, selector) in selectors.iter().enumerate() {
        let hpa = load(dir.path().join(format!("{}_hpa.yaml", selector))).unwrap();
        assert_eq!(hpa.name_any(), format!("hpa-{}", i));
        let spec = hpa.spec.unwrap();
        assert_eq!(spec.scale_target_ref.name, format!("deployment-{}", i));
    }
}

#[test]
fn test_single_yaml_workload() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ModelStore::new().with_output_dir(dir.path());
    store
        .add_deployment(
            DeploymentModel::builder()
                .name(DEPLOYMENT_NAME)
                .label(KUBERNETES_SELECTOR_KEY, SELECTOR)
                .single_yaml(true)
                .build()
                .unwrap(),
        )
        .unwrap();
    store
        .attach_autoscaler(
            PodAutoscalerModel::builder()
                .name(HPA_NAME)
                .deployment(DEPLOYMENT_NAME)
                .build()
                .unwrap(),
        )
        .unwrap();

    let written = HpaHandler::new(&store).create_artifacts().unwrap();
    assert_eq!(written, vec![dir.path().join("hello.yaml")]);

    let first = fs::read(&written[0]).unwrap();
    let autoscalers = hpagen::load_all(&written[0]).unwrap();
    assert_eq!(autoscalers.len(), 1);
    assert_eq!(autoscalers[0].name_any(), HPA_NAME);

    // A second run starts the combined file over instead of appending to it.
    HpaHandler::new(&store).create_artifacts().unwrap();
    assert_eq!(fs::read(&written[0]).unwrap(), first);
}
