//! Standard library, registered by every [`Pipeline`](crate::pipeline::Pipeline).

mod collection;
mod document;
mod flow;
mod math;
mod reference;
mod text;

use crate::function::Library;

pub const LIBRARY_NAME: &str = "stdlib";

pub fn library() -> Library {
    let functions = [
        document::functions(),
        flow::functions(),
        math::functions(),
        text::functions(),
        collection::functions(),
        reference::functions(),
    ]
    .concat();
    Library::new(LIBRARY_NAME, functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_function_names_unique() {
        let library = library();
        let names: HashSet<&str> = library.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names.len(), library.functions.len());
        assert!(library.function("foreach").is_some());
    }
}
