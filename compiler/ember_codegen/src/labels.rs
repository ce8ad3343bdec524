//! Branch label allocation.

/// Labels of one loop.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LoopLabels {
    /// Outer `block`; branching here leaves the loop.
    pub break_label: String,
    /// Inner `loop`; branching here re-tests the condition.
    pub loop_label: String,
    /// Target of `continue`. For `for` loops this is a block around the
    /// body so the update still runs; for `while` it is the loop head.
    pub continue_label: String,
}

/// Hands out labels that are unique for one compilation.
///
/// One generator is owned by each compilation run and threaded through the
/// emitter, so separate runs in one process never share a counter.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next: u32,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels for a `while` loop.
    pub fn while_loop(&mut self) -> LoopLabels {
        let n = self.bump();
        LoopLabels {
            break_label: format!("$block_{n}"),
            loop_label: format!("$loop_{n}"),
            continue_label: format!("$loop_{n}"),
        }
    }

    /// Labels for a `for` loop.
    pub fn for_loop(&mut self) -> LoopLabels {
        let n = self.bump();
        LoopLabels {
            break_label: format!("$block_{n}"),
            loop_label: format!("$loop_{n}"),
            continue_label: format!("$continue_{n}"),
        }
    }

    /// Number of loops labelled so far.
    pub fn issued(&self) -> u32 {
        self.next
    }

    fn bump(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        tracing::trace!(label = n, "allocated loop labels");
        n
    }
}

#[cfg(test)]
mod tests;
