//! Selector state for the dashboard, independent of the terminal

use log::warn;

use crate::catalog::DropdownOption;
use crate::engine::{Selection, VariantEngine, VariantReport};
use crate::store::DdgStore;

const MAX_ACTIVITY: usize = 100;

/// The four cascading selector columns, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Gene,
    Residue,
    MutFrom,
    MutTo,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Gene, Column::Residue, Column::MutFrom, Column::MutTo];

    pub fn title(self) -> &'static str {
        match self {
            Column::Gene => "Gene",
            Column::Residue => "Residual",
            Column::MutFrom => "Mutation From",
            Column::MutTo => "Mutation To",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Column::Gene => "Select a gene...",
            Column::Residue => "Select a residual...",
            Column::MutFrom => "Select mutation from...",
            Column::MutTo => "Select mutation to...",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Column::Gene => Column::Residue,
            Column::Residue => Column::MutFrom,
            Column::MutFrom => Column::MutTo,
            Column::MutTo => Column::Gene,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Column::Gene => Column::MutTo,
            Column::Residue => Column::Gene,
            Column::MutFrom => Column::Residue,
            Column::MutTo => Column::MutFrom,
        }
    }
}

/// Options for one column, a highlight cursor and the chosen entry
#[derive(Debug, Clone)]
pub struct Selector<T> {
    options: Vec<DropdownOption<T>>,
    cursor: usize,
    selected: Option<usize>,
}

impl<T: Clone> Selector<T> {
    pub fn new(options: Vec<DropdownOption<T>>) -> Self {
        Self {
            options,
            cursor: 0,
            selected: None,
        }
    }

    /// Replace the options and drop any selection
    pub fn reset(&mut self, options: Vec<DropdownOption<T>>) {
        *self = Self::new(options);
    }

    pub fn options(&self) -> &[DropdownOption<T>] {
        &self.options
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn value(&self) -> Option<T> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(|o| o.value.clone())
    }

    pub fn label(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.options.get(idx))
            .map(|o| o.label.as_str())
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let last = self.options.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    /// Select the highlighted option; false when there is nothing to select
    fn choose(&mut self) -> bool {
        if self.cursor < self.options.len() {
            self.selected = Some(self.cursor);
            true
        } else {
            false
        }
    }

    fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }
}

/// Dashboard state: selectors, the current report and an activity log
pub struct Dashboard<'e, S> {
    engine: &'e VariantEngine<S>,
    pub gene: Selector<String>,
    pub residue: Selector<i64>,
    pub mut_from: Selector<String>,
    pub mut_to: Selector<String>,
    focus: Column,
    report: VariantReport,
    activity: Vec<String>,
}

impl<'e, S: DdgStore> Dashboard<'e, S> {
    pub fn new(engine: &'e VariantEngine<S>) -> Self {
        let mut dashboard = Self {
            engine,
            gene: Selector::new(engine.gene_options()),
            residue: Selector::new(Vec::new()),
            mut_from: Selector::new(Vec::new()),
            mut_to: Selector::new(Vec::new()),
            focus: Column::Gene,
            report: VariantReport::empty(),
            activity: Vec::new(),
        };
        dashboard.log(format!(
            "{} genes available",
            dashboard.gene.options().len()
        ));
        dashboard
    }

    pub fn focus(&self) -> Column {
        self.focus
    }

    pub fn report(&self) -> &VariantReport {
        &self.report
    }

    pub fn activity(&self) -> &[String] {
        &self.activity
    }

    pub fn selection(&self) -> Selection {
        Selection {
            gene: self.gene.value(),
            residue: self.residue.value(),
            mut_from: self.mut_from.value(),
            mut_to: self.mut_to.value(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Column::Gene => self.gene.move_cursor(delta),
            Column::Residue => self.residue.move_cursor(delta),
            Column::MutFrom => self.mut_from.move_cursor(delta),
            Column::MutTo => self.mut_to.move_cursor(delta),
        }
    }

    /// Select the highlighted option in the focused column.
    ///
    /// Downstream columns are cleared and reloaded, then the report is
    /// recomputed. Focus advances to the next column.
    pub fn choose(&mut self) {
        let chosen = match self.focus {
            Column::Gene => self.gene.choose(),
            Column::Residue => self.residue.choose(),
            Column::MutFrom => self.mut_from.choose(),
            Column::MutTo => self.mut_to.choose(),
        };
        if !chosen {
            return;
        }
        self.cascade_from(self.focus);
        if self.focus != Column::MutTo {
            self.focus = self.focus.next();
        }
    }

    /// Clear the focused column's selection
    pub fn clear(&mut self) {
        let cleared = match self.focus {
            Column::Gene => self.gene.clear(),
            Column::Residue => self.residue.clear(),
            Column::MutFrom => self.mut_from.clear(),
            Column::MutTo => self.mut_to.clear(),
        };
        if cleared {
            self.cascade_from(self.focus);
        }
    }

    /// Reload every column right of `column`. Each reload reads the
    /// selections left of it after they have been reset.
    fn cascade_from(&mut self, column: Column) {
        let gene = self.gene.value();

        if column == Column::Gene {
            self.residue
                .reset(self.engine.residue_options(gene.as_deref()));
        }
        let residue = self.residue.value();

        if matches!(column, Column::Gene | Column::Residue) {
            self.mut_from
                .reset(self.engine.mut_from_options(gene.as_deref(), residue));
        }
        let mut_from = self.mut_from.value();

        if column != Column::MutTo {
            self.mut_to.reset(self.engine.mut_to_options(
                gene.as_deref(),
                residue,
                mut_from.as_deref(),
            ));
        }

        self.refresh();
    }

    /// Recompute the report; storage failures degrade to the empty report
    pub fn refresh(&mut self) {
        let selection = self.selection();
        match self.engine.report(&selection) {
            Ok(report) => {
                if let (Some(variant), Some(gene)) = (&report.variant, &report.gene) {
                    let message = match report.median {
                        Some(m) => format!("{} {}: median {:.2} kcal/mol", gene, variant, m),
                        None => format!("{} {}: no ΔΔG values", gene, variant),
                    };
                    self.log(message);
                }
                self.report = report;
            }
            Err(e) => {
                warn!("Lookup failed: {:#}", e);
                self.log(format!("Lookup failed: {:#}", e));
                self.report = VariantReport::empty();
            }
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.activity.push(message.into());
        if self.activity.len() > MAX_ACTIVITY {
            self.activity.remove(0);
        }
    }
}
