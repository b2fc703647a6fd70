//! Result tables in user units.

use std::fmt;

use cf_core::units::{Quantity, UnitSystem};
use cf_network::NetworkResults;
use cf_results::StudyRecord;

use crate::error::{AppError, AppResult};

/// Plain text table with aligned columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            for (i, (cell, w)) in cells.iter().zip(&widths).enumerate() {
                if i > 0 {
                    f.write_str("  ")?;
                }
                write!(f, "{cell:>w$}")?;
            }
            writeln!(f)
        };
        line(f, &self.headers)?;
        for row in &self.rows {
            line(f, row)?;
        }
        Ok(())
    }
}

fn num(value: f64) -> String {
    if value == 0.0 || (1e-3..1e6).contains(&value.abs()) {
        format!("{value:.4}")
    } else {
        format!("{value:.4e}")
    }
}

fn header(name: &str, units: &UnitSystem, quantity: Quantity) -> String {
    format!("{name} [{}]", units.label(quantity))
}

/// Connection states: `m`, `p`, `h`, `T`, `x`.
pub fn connection_table(results: &NetworkResults, units: &UnitSystem) -> Table {
    let headers = vec![
        "connection".to_string(),
        header("m", units, Quantity::MassFlow),
        header("p", units, Quantity::Pressure),
        header("h", units, Quantity::Enthalpy),
        header("T", units, Quantity::Temperature),
        "x [-]".to_string(),
    ];
    let rows = results
        .connections
        .iter()
        .map(|c| {
            let s = &c.stream;
            vec![
                c.label.clone(),
                num(s.m),
                num(units.from_si(Quantity::Pressure, s.p)),
                num(units.from_si(Quantity::Enthalpy, s.h)),
                num(units.from_si(Quantity::Temperature, s.t)),
                s.quality.map(num).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    Table { headers, rows }
}

/// One row per component parameter.
pub fn component_table(results: &NetworkResults, units: &UnitSystem) -> Table {
    let headers = ["component", "type", "parameter", "value", "unit"]
        .map(String::from)
        .to_vec();
    let mut rows = Vec::new();
    for comp in &results.components {
        for (param, &value) in &comp.params {
            let quantity = param.quantity();
            rows.push(vec![
                comp.label.clone(),
                comp.kind.to_string(),
                param.key().to_string(),
                num(units.from_si(quantity, value)),
                units.label(quantity),
            ]);
        }
    }
    Table { headers, rows }
}

/// Bus totals and member contributions in W.
pub fn bus_table(results: &NetworkResults) -> Table {
    let headers = ["bus", "component", "value [W]", "contribution [W]"]
        .map(String::from)
        .to_vec();
    let mut rows = Vec::new();
    for bus in &results.buses {
        for member in &bus.members {
            rows.push(vec![
                bus.label.clone(),
                member.component.clone(),
                num(member.value),
                num(member.contribution),
            ]);
        }
        rows.push(vec![
            bus.label.clone(),
            "total".to_string(),
            "-".to_string(),
            num(bus.total),
        ]);
    }
    Table { headers, rows }
}

/// Study points with every output any point reported.
pub fn study_table(variable: &str, records: &[StudyRecord]) -> AppResult<Table> {
    if records.is_empty() {
        return Err(AppError::InvalidInput("study has no points".to_string()));
    }
    let mut outputs: Vec<&str> = records
        .iter()
        .flat_map(|r| r.outputs.keys().map(String::as_str))
        .collect();
    outputs.sort_unstable();
    outputs.dedup();

    let mut headers = vec![variable.to_string(), "converged".to_string()];
    headers.extend(outputs.iter().map(|o| o.to_string()));
    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![num(r.value), r.converged.to_string()];
            row.extend(outputs.iter().map(|o| {
                r.outputs
                    .get(*o)
                    .map(|&v| num(v))
                    .unwrap_or_else(|| "-".to_string())
            }));
            row
        })
        .collect();
    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(index: usize, value: f64, power: Option<f64>) -> StudyRecord {
        let mut outputs = BTreeMap::new();
        if let Some(p) = power {
            outputs.insert("power".to_string(), p);
        }
        StudyRecord {
            index,
            value,
            converged: power.is_some(),
            error: power.is_none().then(|| "did not converge".to_string()),
            outputs,
        }
    }

    #[test]
    fn study_table_marks_missing_outputs() {
        let table = study_table("1.m", &[record(0, 10.0, Some(-1.2e7)), record(1, 20.0, None)])
            .unwrap();
        assert_eq!(table.headers, vec!["1.m", "converged", "power"]);
        assert_eq!(table.rows[1], vec!["20.0000", "false", "-"]);
        assert_eq!(table.rows[0][2], "-1.2000e7");
    }

    #[test]
    fn empty_study_is_an_error() {
        assert!(study_table("1.m", &[]).is_err());
    }

    #[test]
    fn columns_align() {
        let table = Table {
            headers: vec!["a".to_string(), "bb".to_string()],
            rows: vec![vec!["100".to_string(), "1".to_string()]],
        };
        assert_eq!(table.to_string(), "  a  bb\n100   1\n");
    }
}
