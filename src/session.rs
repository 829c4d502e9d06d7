//! Account/session boundary. The core asks the session store for one
//! thing only: which exercise is currently selected.

use crate::analysis::ExerciseKind;

pub(crate) trait SessionStore {
    fn current_exercise(&self) -> ExerciseKind;
}

/// Session backed by an up-front selection (the CLI argument).
pub(crate) struct StaticSession {
    exercise: ExerciseKind,
}

impl StaticSession {
    pub(crate) fn new(exercise: ExerciseKind) -> Self {
        Self { exercise }
    }
}

impl SessionStore for StaticSession {
    fn current_exercise(&self) -> ExerciseKind {
        self.exercise
    }
}
