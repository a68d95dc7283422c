use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{error::AppResult, models::Recommendation};

pub const HEADER: &str = "animeId,animeScore,animeTitle,reasonRecommended";

/// Writes the header and one `id,score,name,reason` row per recommendation
///
/// Names are expected to be free of delimiters already.
pub fn write_recommendations<W: Write>(mut out: W, recommendations: &[Recommendation]) -> AppResult<()> {
    writeln!(out, "{}", HEADER)?;
    for rec in recommendations {
        writeln!(
            out,
            "{},{},{},{}",
            rec.candidate.id, rec.candidate.score, rec.candidate.name, rec.reason
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Truncates `path` and writes the report to it
pub fn save_report(path: impl AsRef<Path>, recommendations: &[Recommendation]) -> AppResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_recommendations(BufWriter::new(file), recommendations)?;

    tracing::info!(
        path = %path.display(),
        rows = recommendations.len(),
        "Recommendations saved"
    );

    Ok(())
}
