//! Command implementations

pub mod deploy;
pub mod interpolate;

use std::sync::Arc;

use crate::cli::VarArgs;
use crate::domain::VariableSet;
use crate::infrastructure::VarsFile;

/// Assemble the variable chain from CLI flags: pairs first, then files in order
pub fn variable_set(args: &VarArgs) -> VariableSet {
    let set = args
        .vars
        .iter()
        .cloned()
        .fold(VariableSet::new(), VariableSet::with_kv);

    args.vars_files
        .iter()
        .fold(set, |set, path| set.with_source(Arc::new(VarsFile::new(path))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VarKv;
    use serde_yaml::Value;
    use std::io::Write;

    #[tokio::test]
    async fn test_variable_set_from_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name1: val1-from-file\nname2: val2-from-file").unwrap();

        let args = VarArgs {
            vars: vec![VarKv::new("name1", "val1-from-kv")],
            vars_files: vec![file.path().to_path_buf()],
        };

        let vars = variable_set(&args).resolve().await.unwrap();
        assert_eq!(vars.lookup("name1").unwrap().0, &Value::from("val1-from-kv"));
        assert_eq!(vars.lookup("name2").unwrap().0, &Value::from("val2-from-file"));
    }

    #[test]
    fn test_no_flags_means_no_sources() {
        assert!(variable_set(&VarArgs::default()).is_empty());
    }
}
