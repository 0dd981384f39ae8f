use crate::error::{Result, TriageError};
use crate::types::{Category, CleanRow, ParsedReport, RawRow, Report, Urgency};
use crate::util::{median, non_empty, parse_date_safe, parse_f64_safe, parse_flag, yes_no};
use chrono::Datelike;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info, warn};

/// Sentinel written in place of a missing comment.
pub const NO_COMMENT: &str = "Sin comentario";
pub const UNSPECIFIED_GENDER: &str = "No especificado";
const UNKNOWN_CITY: &str = "Desconocida";

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    pub unknown_labels: usize,
    pub imputed_ages: usize,
    pub missing_comments: usize,
    pub median_age: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanStats {
    pub imputed_ages: usize,
    pub missing_comments: usize,
    pub median_age: f64,
}

/// Read the complaint CSV and return the cleaned reports plus diagnostics.
///
/// Rows that cannot be deserialized or whose category/urgency label is not
/// one of the known values are skipped and counted. I/O and header errors are
/// returned to the caller.
pub fn load_and_clean(path: &Path) -> Result<(Vec<Report>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut unknown_labels = 0usize;
    let mut parsed: Vec<ParsedReport> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = total_rows, error = %e, "skipping malformed row");
                parse_errors += 1;
                continue;
            }
        };
        match parse_row(row) {
            Ok(r) => parsed.push(r),
            Err(e) => {
                debug!(row = total_rows, error = %e, "skipping row with unknown label");
                unknown_labels += 1;
            }
        }
    }

    let (reports, stats) = clean(&parsed);
    if parse_errors + unknown_labels > 0 {
        warn!(parse_errors, unknown_labels, "some rows were skipped while loading");
    }
    info!(
        total_rows,
        kept_rows = reports.len(),
        imputed_ages = stats.imputed_ages,
        median_age = stats.median_age,
        "dataset loaded"
    );

    let report = LoadReport {
        total_rows,
        kept_rows: reports.len(),
        parse_errors,
        unknown_labels,
        imputed_ages: stats.imputed_ages,
        missing_comments: stats.missing_comments,
        median_age: stats.median_age,
    };
    Ok((reports, report))
}

/// Turn one raw CSV row into a typed report. Category and urgency are a
/// closed set, so an unrecognized label is an error rather than a default.
pub fn parse_row(row: RawRow) -> Result<ParsedReport> {
    let category: Category = row
        .category
        .as_deref()
        .ok_or_else(|| TriageError::UnknownCategory(String::new()))?
        .parse()?;
    let urgency: Urgency = row
        .urgency
        .as_deref()
        .ok_or_else(|| TriageError::UnknownUrgency(String::new()))?
        .parse()?;

    Ok(ParsedReport {
        comment: non_empty(row.comment),
        category,
        urgency,
        city: non_empty(row.city).unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        age: parse_f64_safe(row.age.as_deref()),
        report_date: parse_date_safe(row.report_date.as_deref()),
        internet_access: parse_flag(row.internet_access.as_deref()),
        prior_attention: parse_flag(row.prior_attention.as_deref()),
        rural_zone: parse_flag(row.rural_zone.as_deref()),
        gender: non_empty(row.gender),
    })
}

/// Fill the gaps of parsed reports: missing ages get the dataset median,
/// missing comments the `Sin comentario` sentinel and short gender codes are
/// spelled out. Applying it to its own output changes nothing.
pub fn clean(rows: &[ParsedReport]) -> (Vec<Report>, CleanStats) {
    let ages: Vec<f64> = rows.iter().filter_map(|r| r.age).collect();
    if ages.is_empty() && !rows.is_empty() {
        warn!("no ages present in the dataset; imputing 0");
    }
    let median_age = median(ages);

    let mut stats = CleanStats {
        median_age,
        ..CleanStats::default()
    };
    let reports = rows
        .iter()
        .map(|r| {
            let age = r.age.unwrap_or_else(|| {
                stats.imputed_ages += 1;
                median_age
            });
            let comment = match &r.comment {
                Some(c) => c.trim().to_string(),
                None => {
                    stats.missing_comments += 1;
                    NO_COMMENT.to_string()
                }
            };
            Report {
                comment,
                category: r.category,
                urgency: r.urgency,
                city: r.city.trim().to_string(),
                age,
                report_date: r.report_date,
                internet_access: r.internet_access,
                prior_attention: r.prior_attention,
                rural_zone: r.rural_zone,
                gender: normalize_gender(r.gender.as_deref()),
            }
        })
        .collect();
    (reports, stats)
}

pub fn normalize_gender(g: Option<&str>) -> String {
    match g.map(str::trim) {
        Some("M") => "Masculino".to_string(),
        Some("F") => "Femenino".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => UNSPECIFIED_GENDER.to_string(),
    }
}

/// Whether the report carries a real comment (not the missing sentinel).
pub fn has_comment(r: &Report) -> bool {
    r.comment != NO_COMMENT && !r.comment.is_empty()
}

pub fn to_clean_rows(reports: &[Report]) -> Vec<CleanRow> {
    reports
        .iter()
        .map(|r| CleanRow {
            comment: r.comment.clone(),
            category: r.category,
            urgency: r.urgency,
            city: r.city.clone(),
            age: r.age,
            report_date: r
                .report_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            internet_access: r.internet_access as u8,
            prior_attention: r.prior_attention as u8,
            rural_zone: r.rural_zone as u8,
            gender: r.gender.clone(),
            year: r.report_date.map(|d| d.year()),
            month: r.report_date.map(|d| d.month()),
            has_internet: yes_no(r.internet_access),
            government_attention: yes_no(r.prior_attention),
            is_rural: yes_no(r.rural_zone),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::output::write_csv;
    use std::io::Write;

    pub(crate) const SAMPLE_CSV: &str = "\
Comentario,Categoría del problema,Nivel de urgencia,Ciudad,Edad,Fecha del reporte,Acceso a internet,Atención previa del gobierno,Zona rural,Género
necesitamos más médicos en el hospital,Salud,Urgente,Bogotá,34,2024-01-15,1,0,0,M
,Educación,No urgente,Cali,,2024-02-01,0,0,1,F
hay mucha delincuencia en el barrio,Seguridad,Urgente, Medellín ,50,not-a-date,1,1,0,Otro
las calles están llenas de basura,Medio Ambiente,No urgente,Pasto,22,2024-03-10,0,1,1,
esto no es una categoría,Transporte,Urgente,Cali,40,2024-03-11,1,0,0,M
";

    pub(crate) fn write_sample(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn loads_cleans_and_counts() {
        let f = write_sample(SAMPLE_CSV);
        let (reports, rep) = load_and_clean(f.path()).unwrap();
        assert_eq!(rep.total_rows, 5);
        assert_eq!(rep.kept_rows, 4);
        assert_eq!(rep.unknown_labels, 1);
        assert_eq!(rep.imputed_ages, 1);
        assert_eq!(rep.missing_comments, 1);
        // Median of 34, 50, 22.
        assert_eq!(rep.median_age, 34.0);

        assert_eq!(reports[1].comment, NO_COMMENT);
        assert_eq!(reports[1].age, 34.0);
        assert_eq!(reports[1].gender, "Femenino");
        assert_eq!(reports[0].gender, "Masculino");
        assert_eq!(reports[2].city, "Medellín");
        assert_eq!(reports[2].report_date, None);
        assert_eq!(reports[3].gender, UNSPECIFIED_GENDER);
        assert!(reports[1].rural_zone);
        assert!(!has_comment(&reports[1]));
    }

    #[test]
    fn missing_file_is_surfaced() {
        let err = load_and_clean(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, TriageError::Csv(_)));
    }

    #[test]
    fn cleaning_is_idempotent_in_memory() {
        let f = write_sample(SAMPLE_CSV);
        let (once, _) = load_and_clean(f.path()).unwrap();
        let reparsed: Vec<ParsedReport> = once.iter().map(ParsedReport::from).collect();
        let (twice, stats) = clean(&reparsed);
        assert_eq!(once, twice);
        assert_eq!(stats.imputed_ages, 0);
        assert_eq!(stats.missing_comments, 0);
    }

    #[test]
    fn cleaning_is_idempotent_through_the_exported_csv() {
        let f = write_sample(SAMPLE_CSV);
        let (once, _) = load_and_clean(f.path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clean.csv");
        write_csv(&out, &to_clean_rows(&once)).unwrap();

        let (twice, rep) = load_and_clean(&out).unwrap();
        assert_eq!(rep.imputed_ages, 0);
        assert_eq!(once, twice);
    }
}
