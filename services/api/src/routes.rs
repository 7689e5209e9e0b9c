use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use admit_ai::workflows::admission::{
    admission_router, AdmissionEvaluationService, AlertPublisher, AuthorizationStatus,
    BusinessWeights, ClinicalFeatures, ConfigStore, EvaluationOutcome, EvaluationRepository,
    EvaluationRequest, FacilityId, PayerType,
};

/// What-if recalculation payload: the clinical features plus the request
/// assumptions. The LOS may be omitted, in which case the classifier's
/// baseline estimate is used.
#[derive(Debug, Deserialize)]
pub(crate) struct WhatIfRequest {
    pub(crate) features: ClinicalFeatures,
    pub(crate) facility_id: FacilityId,
    pub(crate) payer_type: PayerType,
    #[serde(default)]
    pub(crate) projected_los: Option<u16>,
    #[serde(default = "default_authorization")]
    pub(crate) authorization: AuthorizationStatus,
    #[serde(default)]
    pub(crate) census_priority: f32,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) weights: Option<BusinessWeights>,
}

fn default_authorization() -> AuthorizationStatus {
    AuthorizationStatus::Unknown
}

pub(crate) fn with_admission_routes<S, R, A>(
    service: Arc<AdmissionEvaluationService<S, R, A>>,
) -> axum::Router
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    admission_router(service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .merge(
            axum::Router::new()
                .route(
                    "/api/v1/admissions/what-if",
                    axum::routing::post(what_if_endpoint::<S, R, A>),
                )
                .with_state(service),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn what_if_endpoint<S, R, A>(
    axum::extract::State(service): axum::extract::State<
        Arc<AdmissionEvaluationService<S, R, A>>,
    >,
    Json(payload): Json<WhatIfRequest>,
) -> Result<Json<EvaluationOutcome>, admit_ai::error::AppError>
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let WhatIfRequest {
        features,
        facility_id,
        payer_type,
        projected_los,
        authorization,
        census_priority,
        as_of,
        weights,
    } = payload;

    let projected_los = projected_los.unwrap_or_else(|| {
        let (case_mix, _) = service.classifier().classify(&features);
        service.classifier().estimate_los(&case_mix)
    });

    let request = EvaluationRequest {
        facility_id,
        payer_type,
        projected_los,
        authorization,
        census_priority,
        as_of: as_of.unwrap_or_else(|| Local::now().date_naive()),
        weights,
    };

    let outcome = service
        .what_if(&features, &request)
        .map_err(admit_ai::error::AppError::Evaluation)?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_demo_service, demo_facility};
    use admit_ai::workflows::admission::{
        FunctionalStatus, Recommendation, SpecialServices, TherapyNeeds,
    };

    fn rehab_features() -> ClinicalFeatures {
        ClinicalFeatures {
            primary_diagnosis: "M16.11".to_string(),
            comorbidities: vec!["I50.9".to_string(), "E11.9".to_string()],
            medications: vec!["metoprolol".to_string()],
            functional_status: FunctionalStatus {
                adl_score: Some(12),
                cognitive_score: Some(13),
            },
            therapy_needs: TherapyNeeds {
                physical: true,
                occupational: true,
                speech: false,
            },
            special_services: SpecialServices::default(),
            transport: None,
            prior_readmission: false,
            observations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn what_if_endpoint_estimates_los_when_missing() {
        let service = build_demo_service();
        let request = WhatIfRequest {
            features: rehab_features(),
            facility_id: demo_facility().facility_id,
            payer_type: PayerType::MedicareAdvantage,
            projected_los: None,
            authorization: AuthorizationStatus::Approved,
            census_priority: 0.5,
            as_of: Some(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid")),
            weights: None,
        };

        let Json(outcome) = what_if_endpoint(axum::extract::State(service), Json(request))
            .await
            .expect("what-if evaluates");

        // TB baseline of 14 days.
        assert_eq!(outcome.projection.los, 14);
        assert!(matches!(
            outcome.score.recommendation,
            Recommendation::Accept | Recommendation::Defer
        ));
    }

    #[tokio::test]
    async fn what_if_endpoint_honors_an_explicit_los() {
        let service = build_demo_service();
        let request = WhatIfRequest {
            features: rehab_features(),
            facility_id: demo_facility().facility_id,
            payer_type: PayerType::MedicareAdvantage,
            projected_los: Some(40),
            authorization: AuthorizationStatus::Approved,
            census_priority: 0.5,
            as_of: Some(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid")),
            weights: None,
        };

        let Json(outcome) = what_if_endpoint(axum::extract::State(service), Json(request))
            .await
            .expect("what-if evaluates");

        assert_eq!(outcome.projection.los, 40);
        // 30 days at 450 and 10 at 400.
        assert_eq!(
            outcome.projection.revenue.total,
            rust_decimal_macros::dec!(17500.00)
        );
    }
}
