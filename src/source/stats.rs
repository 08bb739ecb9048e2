//! Running descriptive statistics for one numeric column

/// Count, mean, sample standard deviation and range of a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    /// Column name
    pub column: String,
    /// Number of observed values
    pub count: u64,
    /// Smallest observed value
    pub min: Option<f64>,
    /// Largest observed value
    pub max: Option<f64>,
    mean: f64,
    m2: f64,
}

impl ColumnStats {
    /// Empty statistics for `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            count: 0,
            min: None,
            max: None,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Fold one value in (Welford's update)
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Arithmetic mean, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation, `None` with fewer than two values
    pub fn std(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}
