use crate::constants::{
    CPU_RESOURCE_NAME, DEPLOYMENT_API_VERSION, DEPLOYMENT_KIND, RESOURCE_METRIC_TYPE,
    UTILIZATION_TARGET_TYPE,
};
use crate::error::{self, Result};

use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    MetricSpec, MetricTarget, ResourceMetricSource,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use models::autoscaler::PodAutoscalerModel;
use models::constants::{MAX_CPU_PERCENTAGE, MIN_CPU_PERCENTAGE};
use models::deployment::DeploymentModel;
use snafu::ensure;
use tracing::{event, Level};

/// Generates the HorizontalPodAutoscaler for a deployment.
///
/// Autoscaling is opt-in: a deployment without an autoscaler yields `Ok(None)`.
pub fn generate(
    deployment: &DeploymentModel,
    autoscaler: Option<&PodAutoscalerModel>,
) -> Result<Option<HorizontalPodAutoscaler>> {
    let autoscaler = match autoscaler {
        Some(autoscaler) => autoscaler,
        None => {
            event!(
                Level::DEBUG,
                deployment = %deployment.name,
                "Deployment is not autoscaled, skipping HPA generation."
            );
            return Ok(None);
        }
    };

    ensure!(
        autoscaler.deployment.is_empty() || autoscaler.deployment == deployment.name,
        error::DetachedAutoscalerSnafu {
            hpa_name: autoscaler.name.clone(),
            deployment: deployment.name.clone(),
            target: autoscaler.deployment.clone(),
        }
    );

    generate_hpa(autoscaler).map(Some)
}

/// Generates an `autoscaling/v2` HorizontalPodAutoscaler scaling a Deployment on average CPU
/// utilization.
pub fn generate_hpa(autoscaler: &PodAutoscalerModel) -> Result<HorizontalPodAutoscaler> {
    ensure!(
        !autoscaler.deployment.is_empty(),
        error::MissingDeploymentReferenceSnafu {
            hpa_name: autoscaler.name.clone(),
        }
    );
    ensure!(
        (MIN_CPU_PERCENTAGE..=MAX_CPU_PERCENTAGE).contains(&autoscaler.cpu_percentage),
        error::CpuPercentageOutOfRangeSnafu {
            hpa_name: autoscaler.name.clone(),
            cpu_percentage: autoscaler.cpu_percentage,
        }
    );
    ensure!(
        autoscaler.min_replicas <= autoscaler.max_replicas,
        error::ReplicaBoundsInvertedSnafu {
            hpa_name: autoscaler.name.clone(),
            min_replicas: autoscaler.min_replicas,
            max_replicas: autoscaler.max_replicas,
        }
    );

    event!(
        Level::DEBUG,
        hpa = %autoscaler.name,
        deployment = %autoscaler.deployment,
        min_replicas = autoscaler.min_replicas,
        max_replicas = autoscaler.max_replicas,
        cpu_percentage = autoscaler.cpu_percentage,
        "Generating HorizontalPodAutoscaler."
    );

    Ok(HorizontalPodAutoscaler {
        metadata: ObjectMeta {
            name: Some(autoscaler.name.clone()),
            labels: (!autoscaler.labels.is_empty()).then(|| autoscaler.labels.clone()),
            ..Default::default()
        },
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some(DEPLOYMENT_API_VERSION.to_string()),
                kind: DEPLOYMENT_KIND.to_string(),
                name: autoscaler.deployment.clone(),
            },
            min_replicas: Some(autoscaler.min_replicas),
            max_replicas: autoscaler.max_replicas,
            metrics: Some(vec![cpu_utilization_metric(autoscaler.cpu_percentage)]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn cpu_utilization_metric(cpu_percentage: i32) -> MetricSpec {
    MetricSpec {
        type_: RESOURCE_METRIC_TYPE.to_string(),
        resource: Some(ResourceMetricSource {
            name: CPU_RESOURCE_NAME.to_string(),
            target: MetricTarget {
                type_: UTILIZATION_TARGET_TYPE.to_string(),
                average_utilization: Some(cpu_percentage),
                ..Default::default()
            },
        }),
        ..Default::default()
    }
}
