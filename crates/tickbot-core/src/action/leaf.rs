use super::Action;

/// Leaf that runs a closure on its first `execute` and is then finished.
pub struct Once<F> {
    work: Option<F>,
}

impl<F> Once<F>
where
    F: FnOnce() + Send,
{
    pub fn new(work: F) -> Self {
        Self { work: Some(work) }
    }
}

impl<F> Action for Once<F>
where
    F: FnOnce() + Send,
{
    fn execute(&mut self) {
        if let Some(work) = self.work.take() {
            work();
        }
    }

    fn is_finished(&self) -> bool {
        self.work.is_none()
    }
}

pub fn once<F>(work: F) -> Once<F>
where
    F: FnOnce() + Send,
{
    Once::new(work)
}
