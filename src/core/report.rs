use crate::domain::analysis::{DiseaseAnalysisResult, DiseaseType};
use crate::domain::model::{BatchEntry, EntryOutcome, LeafImage};
use crate::utils::error::{DiagnosisError, Result};
use std::fmt::Write as _;

const REPORT_TITLE: &str = "Plant Health & Treatment Report";
const RULE: &str = "------------------------------------------------------------";

/// 報告只能使用 Latin-1 字元集，先把常見的排版符號換成 ASCII
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2013}' | '\u{2014}' | '\u{2011}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201c}' | '\u{201d}' => out.push('"'),
            '\u{2022}' => out.push('*'),
            '\u{2122}' => out.push_str("(TM)"),
            '\u{00ae}' => out.push_str("(R)"),
            '\u{00a9}' => out.push_str("(C)"),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn status_line(result: &DiseaseAnalysisResult) -> &'static str {
    match result.disease_type() {
        DiseaseType::InvalidImage => "INVALID IMAGE",
        DiseaseType::Error => "ANALYSIS ERROR",
        _ if result.disease_detected() => "DISEASE DETECTED",
        _ => "PLANT IS HEALTHY",
    }
}

fn section(out: &mut String, heading: &str, items: &[String], bullet: char) {
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", heading);
    let _ = writeln!(out, "{}", RULE);
    for item in items {
        let _ = writeln!(out, "    {} {}", bullet, sanitize_text(item));
    }
}

/// Plain-text rendition of one diagnosis.
pub fn render_text_report(result: &DiseaseAnalysisResult, image: Option<&LeafImage>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{:^60}", REPORT_TITLE);
    let _ = writeln!(out, "{}", RULE);

    if let Some(image) = image {
        let _ = writeln!(
            out,
            "Source image: {} ({} bytes)",
            sanitize_text(&image.file_name()),
            image.bytes.len()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Plant: {}", sanitize_text(result.plant_name()));
    let _ = writeln!(out, "Scientific Name: {}", sanitize_text(result.scientific_name()));
    for (rank, name) in result.taxonomy().ranks() {
        if !name.is_empty() {
            let _ = writeln!(out, "{}: {}", crate::core::normalizer::title_case(rank), sanitize_text(name));
        }
    }
    if !result.description().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", sanitize_text(result.description()));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{}", status_line(result));

    if result.disease_detected() {
        let _ = writeln!(
            out,
            "Primary Issue:  {}",
            sanitize_text(result.disease_name().unwrap_or("N/A"))
        );
        if let Some(scientific) = result.disease_scientific_name() {
            if Some(scientific) != result.disease_name() {
                let _ = writeln!(out, "Pathogen:       {}", sanitize_text(scientific));
            }
        }
        let _ = writeln!(out, "Severity Level: {}", result.severity().as_str().to_uppercase());
        let _ = writeln!(out, "AI Confidence:  {}%", result.confidence());
    } else if result.disease_type() == DiseaseType::Healthy {
        let _ = writeln!(out, "AI Confidence:  {}%", result.confidence());
    }

    section(&mut out, "Symptom Analysis", result.symptoms(), '-');
    section(&mut out, "Possible Causes", result.possible_causes(), '-');
    section(&mut out, "Recommended Treatment & Actions", result.treatment(), '*');

    if !result.similar_images().is_empty() {
        section(&mut out, "Reference Images", result.similar_images(), '>');
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>60}",
        format!("Report Generated: {}", result.analysis_timestamp().to_rfc3339())
    );
    out
}

/// One CSV row per batch entry, transport failures included.
pub fn summary_csv(entries: &[BatchEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "image",
        "status",
        "plant_name",
        "scientific_name",
        "disease_detected",
        "disease_name",
        "disease_type",
        "severity",
        "confidence",
        "analysis_timestamp",
        "error",
    ])?;

    for entry in entries {
        match &entry.outcome {
            EntryOutcome::Analyzed { result } => {
                let detected = result.disease_detected().to_string();
                let confidence = format!("{:.2}", result.confidence());
                let timestamp = result.analysis_timestamp().to_rfc3339();
                writer.write_record([
                    entry.image.as_str(),
                    "analyzed",
                    result.plant_name(),
                    result.scientific_name(),
                    detected.as_str(),
                    result.disease_name().unwrap_or(""),
                    result.disease_type().as_str(),
                    result.severity().as_str(),
                    confidence.as_str(),
                    timestamp.as_str(),
                    "",
                ])?;
            }
            EntryOutcome::TransportError { error } => {
                writer.write_record([
                    entry.image.as_str(),
                    "transport_error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    error.as_str(),
                ])?;
            }
        }
    }

    let bytes = writer.into_inner().map_err(|e| {
        DiagnosisError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
