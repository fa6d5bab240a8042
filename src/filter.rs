use crate::board::Board;

/// Live substring filter over the searchable containers of a board.
///
/// Each target container has its own input value, kept so it can be
/// re-applied after every render pass.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    inputs: Vec<(&'static str, String)>,
}

impl SearchFilter {
    pub fn new(targets: &[&'static str]) -> Self {
        Self {
            inputs: targets.iter().map(|&id| (id, String::new())).collect(),
        }
    }

    /// The same input for every target container.
    pub fn set_input(&mut self, value: &str, board: &mut Board) -> usize {
        for (_, input) in &mut self.inputs {
            *input = value.to_string();
        }
        self.apply(board)
    }

    /// Changes the input of one target only. `None` when `target` is not
    /// searchable.
    pub fn set_input_for(&mut self, target: &str, value: &str, board: &mut Board) -> Option<usize> {
        let (_, input) = self.inputs.iter_mut().find(|(id, _)| *id == target)?;
        *input = value.to_string();
        Some(self.apply(board))
    }

    /// Recomputes visibility of every element in the target containers and
    /// returns how many are visible.
    pub fn apply(&self, board: &mut Board) -> usize {
        let mut visible = 0;
        for (id, input) in &self.inputs {
            let Some(container) = board.container_mut(id) else {
                continue;
            };
            let needle = input.to_lowercase();
            for element in container.elements_mut() {
                let show = needle.is_empty()
                    || element.search().is_some_and(|s| s.contains(&needle));
                element.set_visible(show);
                visible += usize::from(show);
            }
        }
        visible
    }
}
