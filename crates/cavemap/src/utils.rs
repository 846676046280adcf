use crate::types::CleanRecord;

#[derive(Debug, Default)]
pub struct RecordFilter {
    pub min_depth: Option<u32>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl RecordFilter {
    pub fn apply(self, mut records: Vec<CleanRecord>) -> Vec<CleanRecord> {
        if let Some(min) = self.min_depth {
            records.retain(|r| r.depth_m >= min);
        }
        if let Some(off) = self.offset {
            records = records.into_iter().skip(off).collect();
        }
        if let Some(lim) = self.limit {
            records.truncate(lim);
        }
        records
    }

    pub fn validate(self) -> Result<Self, String> {
        if self.offset.is_some_and(|o| o == 0) {
            return Err("Offset must be greater than 0".to_string());
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(self)
    }
}

#[derive(Debug)]
pub struct RecordStats {
    pub total: usize,
    pub with_link: usize,
    pub deepest: Option<(String, u32)>,
    pub longest: Option<(String, f64)>,
}

impl RecordStats {
    pub fn from_records(records: &[CleanRecord]) -> RecordStats {
        RecordStats {
            total: records.len(),
            with_link: records.iter().filter(|r| r.source_url.is_some()).count(),
            deepest: records
                .iter()
                .max_by_key(|r| r.depth_m)
                .map(|r| (r.name.clone(), r.depth_m)),
            longest: records
                .iter()
                .max_by(|a, b| a.length_km.total_cmp(&b.length_km))
                .map(|r| (r.name.clone(), r.length_km)),
        }
    }
}

impl std::fmt::Display for RecordStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Caves:             {}", self.total)?;
        writeln!(f, "  With article link: {}", self.with_link)?;
        if let Some((name, depth)) = &self.deepest {
            writeln!(f, "  Deepest:           {} ({} m)", name, depth)?;
        }
        if let Some((name, length)) = &self.longest {
            writeln!(f, "  Longest:           {} ({} km)", name, length)?;
        }
        Ok(())
    }
}
