use crate::infra::{build_demo_service, demo_facility, parse_date};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;

use admit_ai::error::AppError;
use admit_ai::workflows::admission::ratebook::import_rate_schedules;
use admit_ai::workflows::admission::{
    AuthorizationStatus, ClinicalFeatures, EvaluationOutcome, EvaluationRequest,
    FunctionalStatus, PayerType, RateTerms, SpecialServices, TherapyNeeds,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the projected length of stay for both sample referrals
    #[arg(long)]
    pub(crate) los: Option<u16>,
    /// Census priority between 0.0 (full house) and 1.0 (empty house)
    #[arg(long)]
    pub(crate) census_priority: Option<f32>,
    /// Evaluation date for rate resolution (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RatesValidateArgs {
    /// Path to a rate-schedule CSV export
    #[arg(long)]
    pub(crate) file: PathBuf,
}

pub(crate) fn run_rates_validate(args: RatesValidateArgs) -> Result<(), AppError> {
    let file = File::open(&args.file)?;
    let book = import_rate_schedules(file)?;

    println!("Validated {} rate record(s)", book.records().len());
    for record in book.records() {
        let window = match record.effective.to {
            Some(end) => format!("{} to {}", record.effective.from, end),
            None => format!("{} onward", record.effective.from),
        };
        let shape = match &record.terms {
            RateTerms::MedicareFfs(_) => "PDPM component table".to_string(),
            RateTerms::MedicareAdvantage(_) => "negotiated per-diem contract".to_string(),
            RateTerms::Medicaid(rates) => {
                format!("base {} with {} add-on(s)", rates.base_per_diem, rates.add_ons.len())
            }
            RateTerms::FamilyCare(matrix) => format!(
                "matrix ({} nursing rows, {} NTA bands)",
                matrix.nursing.len(),
                matrix.nta.len()
            ),
        };
        println!(
            "  {} / {:<18} {:<24} {}",
            record.facility_id.0,
            record.payer_type().label(),
            window,
            shape
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        los,
        census_priority,
        as_of,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let census_priority = census_priority.unwrap_or(0.5).clamp(0.0, 1.0);
    let service = build_demo_service();

    let cases: [(&str, ClinicalFeatures, PayerType, u16); 2] = [
        (
            "Hip replacement rehab referral (Medicare FFS)",
            rehab_referral(),
            PayerType::MedicareFfs,
            los.unwrap_or(25),
        ),
        (
            "High-acuity dementia referral (Medicaid)",
            dementia_referral(),
            PayerType::Medicaid,
            los.unwrap_or(45),
        ),
    ];

    for (title, features, payer, projected_los) in cases {
        let request = EvaluationRequest {
            facility_id: demo_facility().facility_id,
            payer_type: payer,
            projected_los,
            authorization: AuthorizationStatus::Approved,
            census_priority,
            as_of,
            weights: None,
        };

        let outcome = service.what_if(&features, &request)?;
        render_outcome(title, &outcome);
    }

    Ok(())
}

fn render_outcome(title: &str, outcome: &EvaluationOutcome) {
    println!("=== {title} ===");
    let case_mix = &outcome.case_mix;
    println!(
        "Case mix: PT/OT {}/{}, SLP {}, nursing {}, NTA {} (band {}), category {}",
        case_mix.pt_group.code(),
        case_mix.ot_group.code(),
        case_mix.slp_group.code(),
        case_mix.nursing_group.code(),
        case_mix.nta_score,
        case_mix.nta_band.label(),
        case_mix.clinical_category.label(),
    );
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }

    println!("Revenue ({} days):", outcome.projection.los);
    for component in &outcome.projection.revenue.components {
        println!(
            "  {:>12}  {:?} - {}",
            component.amount.to_string(),
            component.component,
            component.detail
        );
    }
    println!(
        "  total {} ({}/day)",
        outcome.projection.revenue.total, outcome.projection.revenue.per_diem
    );

    println!("Cost:");
    for component in &outcome.projection.cost.components {
        println!(
            "  {:>12}  {:?} - {}",
            component.amount.to_string(),
            component.component,
            component.detail
        );
    }
    println!(
        "  total {} ({}/day)",
        outcome.projection.cost.total, outcome.projection.cost.per_diem
    );

    println!(
        "Margin: {} total, {}/day ({}%)",
        outcome.projection.margin_total,
        outcome.projection.margin_per_diem,
        outcome.projection.margin_pct
    );

    println!("Score factors:");
    for factor in &outcome.score.factors {
        println!(
            "  {:+7.1}  {:?} - {}",
            factor.contribution, factor.factor, factor.rationale
        );
    }
    println!(
        "Score {:.1}/100 -> {}",
        outcome.score.raw_score,
        outcome.score.recommendation.label()
    );
    println!("{}", outcome.score.summary);
    println!();
}

fn rehab_referral() -> ClinicalFeatures {
    ClinicalFeatures {
        primary_diagnosis: "M16.11".to_string(),
        comorbidities: vec!["I50.9".to_string(), "E11.9".to_string(), "J44.0".to_string()],
        medications: vec!["metoprolol".to_string(), "metformin".to_string()],
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

fn dementia_referral() -> ClinicalFeatures {
    ClinicalFeatures {
        primary_diagnosis: "F03.90".to_string(),
        comorbidities: vec!["F32.9".to_string()],
        medications: vec!["donepezil".to_string(), "sertraline".to_string()],
        functional_status: FunctionalStatus {
            adl_score: Some(16),
            cognitive_score: Some(5),
        },
        therapy_needs: TherapyNeeds::default(),
        special_services: SpecialServices::default(),
        transport: None,
        prior_readmission: false,
        observations: vec!["Falls risk noted on intake".to_string()],
    }
}
