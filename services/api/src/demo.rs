use crate::infra::{InMemorySessionRepository, StubClaimsExchanger, StubRecordsClient};
use clap::Args;
use licence_portal::config::AppConfig;
use licence_portal::error::AppError;
use licence_portal::payment::{CardDetails, MockPaymentGateway, PaymentInstrument};
use licence_portal::wizard::{
    FieldValue, LicenceApplicationService, PaymentParams, RecordSlice,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// NIC number used for the demo login
    #[arg(long)]
    pub(crate) nic: Option<String>,
    /// Force the mock gateway to decline the payment
    #[arg(long)]
    pub(crate) decline: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let nic = args.nic.unwrap_or_else(|| "199925801234".to_string());
    let config = AppConfig::load()?;

    let gateway = if args.decline {
        MockPaymentGateway::always_declining()
    } else {
        MockPaymentGateway::new(0.8, Duration::from_millis(300))
    };

    let service = LicenceApplicationService::new(
        Arc::new(InMemorySessionRepository::default()),
        Arc::new(StubRecordsClient),
        Arc::new(StubClaimsExchanger),
        Arc::new(gateway),
        config.identity.clone(),
        config.wizard,
        config.payment.clone(),
    );

    println!("Licence application demo");

    let view = service.begin_with_nic(&nic)?;
    let id = view.application_id.clone();
    println!(
        "- Logged in as {} (NIC {})",
        view.applicant.full_name,
        view.applicant.nic.as_deref().unwrap_or("unknown")
    );
    println!("  Application {} opened at step {}/{}", id.0, view.current_step, view.total_steps);

    service.next(&id)?;
    println!("\nSupporting records");
    for slice in [
        RecordSlice::Medical,
        RecordSlice::WrittenTest,
        RecordSlice::PracticalTest,
    ] {
        let view = service.fetch_slice(&id, slice).await?;
        match slice {
            RecordSlice::Medical => {
                if let Some(medical) = &view.medical {
                    println!(
                        "- Medical certificate {}: {} ({} at {})",
                        medical.certificate_id,
                        if medical.is_fit_to_drive {
                            "fit to drive"
                        } else {
                            "not fit"
                        },
                        medical.doctor_name,
                        medical.hospital
                    );
                }
            }
            RecordSlice::WrittenTest => {
                if let (Some(test), Some(passed)) = (&view.written_test, view.written_passed) {
                    println!(
                        "- Written test: {}/100 -> {}",
                        test.score,
                        if passed { "PASSED" } else { "FAILED" }
                    );
                }
            }
            RecordSlice::PracticalTest => {
                if let (Some(test), Some(passed)) = (&view.practical_test, view.practical_passed) {
                    println!(
                        "- Practical test: {}/100 -> {}",
                        test.score,
                        if passed { "PASSED" } else { "FAILED" }
                    );
                }
            }
        }
    }

    service.next(&id)?;
    let catalogue = service.licence_categories().await?;
    println!("\nLicence categories on offer:");
    for category in &catalogue {
        println!("- {}: {} ({})", category.id, category.label, category.description);
    }

    service.update_field(
        &id,
        "contact_address",
        FieldValue::Text("No. 123, Galle Road, Colombo 03".to_string()),
    )?;
    let view = service.toggle_category(&id, "B")?;
    println!(
        "Selected categories: {}",
        view.selected_categories
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );

    let record = service.submit(&id)?;
    println!("\nReview payload");
    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  review payload unavailable: {err}"),
    }

    let outcome = service
        .pay(
            &id,
            PaymentParams::default(),
            PaymentInstrument::Card(CardDetails {
                card_number: "4111 1111 1111 1111".to_string(),
                expiry_date: "12/30".to_string(),
                cvv: "123".to_string(),
                cardholder_name: "K A Silva".to_string(),
            }),
        )
        .await?;

    println!(
        "\nPayment {} -> {}",
        outcome.transaction_id,
        outcome.status.label()
    );
    if outcome.success {
        let view = service.get(&id)?;
        println!("Application {} confirmed", view.application_id.0);
    } else {
        println!("Payment declined. Suggested next steps:");
        for hint in &outcome.remediation_hints {
            println!("- {hint}");
        }
    }

    Ok(())
}
