//! Call journal recording which specimen routines actually ran.
//!
//! Every specimen records its own symbol on entry. The journal is what
//! lets tests pin down the invocation discipline from the callee's side:
//! a case that passed must have called its routine, and a routine that
//! forwards to another leaves both symbols in the journal.

use parking_lot::Mutex;

/// Append-only record of specimen entries, in call order.
#[derive(Debug, Default)]
pub struct CallJournal {
    calls: Mutex<Vec<&'static str>>,
}

impl CallJournal {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn record(&self, symbol: &'static str) {
        self.calls.lock().push(symbol);
    }

    /// Copy of the full call sequence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// How many times `symbol` has been recorded.
    #[must_use]
    pub fn count_of(&self, symbol: &str) -> usize {
        self.calls.lock().iter().filter(|s| **s == symbol).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Process-wide journal shared by all specimen routines. The specimens
/// model exported library code, so their bookkeeping is global state just
/// like the hidden tables they read from.
static JOURNAL: CallJournal = CallJournal::new();

#[must_use]
pub fn journal() -> &'static CallJournal {
    &JOURNAL
}
