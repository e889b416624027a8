//! Named response handlers for scripted side effects

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler invoked by `answer(key)`; receives the answer content, if any
pub type ResponseHandler = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Map from handler name to callable, fixed at navigator construction
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ResponseHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Invoke `name` if registered, returning whether it was found
    pub fn invoke(&self, name: &str, content: Option<&str>) -> bool {
        match self.handlers.get(name) {
            Some(handler) => {
                handler(content);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}
