/// Built-in batch snippets that can be inserted at the cursor
pub struct Sample {
    pub title: &'static str,
    pub code: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        title: "Clear screen (cls)",
        code: "cls\n",
    },
    Sample {
        title: "Pause script",
        code: "pause\n",
    },
    Sample {
        title: "Echo Hello World",
        code: "@echo off\necho Hello World\n",
    },
    Sample {
        title: "Set variable and echo",
        code: "set NAME=World\necho Hello %NAME%\n",
    },
    Sample {
        title: "Simple IF condition",
        code: "if \"%1\"==\"\" (\n    echo No argument given\n) else (\n    echo Argument: %1\n)\n",
    },
    Sample {
        title: "Loop for /L example",
        code: "for /L %%i in (1,1,5) do echo %%i\n",
    },
];

/// Look up a sample by its 1-based number as shown by `:samples`
pub fn get(number: usize) -> Option<&'static Sample> {
    number.checked_sub(1).and_then(|idx| SAMPLES.get(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_starts_at_one() {
        assert_eq!(get(1).unwrap().title, "Clear screen (cls)");
        assert!(get(0).is_none());
        assert!(get(SAMPLES.len() + 1).is_none());
    }

    #[test]
    fn every_sample_ends_with_newline() {
        assert!(SAMPLES.iter().all(|s| s.code.ends_with('\n')));
    }
}
