// Interactive terminal prompts. Generic over the reader and writer so the
// selection logic can be driven from tests.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::core::classroom::{Course, Topic};

/// Lines that end a multi-line paste.
const PASTE_SENTINELS: [&str; 2] = ["end", "fim"];

pub struct Prompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// One trimmed line, or `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn ask_with_default(&mut self, prompt: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(&format!("{} [{}]: ", prompt, default))?;
        Ok(answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// Asks until a number in `min..=max` is entered. `None` at end of input.
    pub fn choose_number(&mut self, prompt: &str, min: usize, max: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(Some(n)),
                _ => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    pub fn select_course<'a>(&mut self, courses: &'a [Course]) -> io::Result<Option<&'a Course>> {
        if courses.is_empty() {
            writeln!(self.output, "No courses found.")?;
            return Ok(None);
        }

        writeln!(self.output, "\nCourses:")?;
        for (i, course) in courses.iter().enumerate() {
            writeln!(self.output, "{:2} - {} (ID {})", i + 1, course.name, course.id)?;
        }

        let choice = self.choose_number("\nChoose a course number: ", 1, courses.len())?;
        Ok(choice.map(|n| &courses[n - 1]))
    }

    /// `Ok(None)` means "no topic". End of input also means no topic.
    pub fn select_topic<'a>(&mut self, topics: &'a [Topic]) -> io::Result<Option<&'a Topic>> {
        if topics.is_empty() {
            writeln!(self.output, "This course has no topics; the assignment will not be filed under one.")?;
            return Ok(None);
        }

        writeln!(self.output, "\nTopics:")?;
        writeln!(self.output, " 0 - No topic")?;
        for (i, topic) in topics.iter().enumerate() {
            writeln!(self.output, "{:2} - {}", i + 1, topic.name)?;
        }

        let choice = self.choose_number("\nChoose a topic number: ", 0, topics.len())?;
        Ok(match choice {
            Some(n) if n > 0 => Some(&topics[n - 1]),
            _ => None,
        })
    }

    /// Collects lines until a sentinel line (`end`) or end of input.
    pub fn read_block(&mut self, instructions: &str) -> io::Result<String> {
        writeln!(self.output, "{}", instructions)?;
        writeln!(self.output, "When done, type a single line with: end")?;
        self.output.flush()?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if PASTE_SENTINELS.contains(&line.trim().to_lowercase().as_str()) {
                break;
            }
            lines.push(line.to_string());
        }
        Ok(lines.join("\n"))
    }

    /// True only when the operator types `phrase` exactly.
    pub fn confirm_phrase(&mut self, phrase: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("Type {} to continue: ", phrase))?;
        Ok(answer.as_deref() == Some(phrase))
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classroom::CourseState;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn courses() -> Vec<Course> {
        vec![
            crate::core::test_support::course("c1", "Math", CourseState::Active),
            crate::core::test_support::course("c2", "Art", CourseState::Active),
        ]
    }

    #[test]
    fn test_select_course_retries_invalid_input() {
        let list = courses();
        let mut p = prompter("x\n5\n2\n");

        let chosen = p.select_course(&list).unwrap();

        assert_eq!(chosen.map(|c| c.id.as_str()), Some("c2"));
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Invalid option.").count(), 2);
        assert!(shown.contains(" 1 - Math (ID c1)"));
    }

    #[test]
    fn test_select_course_eof() {
        let list = courses();
        let mut p = prompter("");
        assert!(p.select_course(&list).unwrap().is_none());
    }

    #[test]
    fn test_select_topic_zero_is_none() {
        let topics = vec![Topic {
            topic_id: "t1".to_string(),
            name: "Week 1".to_string(),
        }];

        assert!(prompter("0\n").select_topic(&topics).unwrap().is_none());
        assert_eq!(
            prompter("1\n")
                .select_topic(&topics)
                .unwrap()
                .map(|t| t.topic_id.clone()),
            Some("t1".to_string())
        );
    }

    #[test]
    fn test_read_block_stops_at_sentinel() {
        let mut p = prompter("P1: Q\r\nA) a\n  END \nignored\n");
        assert_eq!(p.read_block("Paste:").unwrap(), "P1: Q\nA) a");

        let mut p = prompter("P1: Q\nA) a");
        assert_eq!(p.read_block("Paste:").unwrap(), "P1: Q\nA) a");
    }

    #[test]
    fn test_confirm_phrase_is_exact() {
        assert!(prompter("DELETE_ALL\n").confirm_phrase("DELETE_ALL").unwrap());
        assert!(!prompter("delete_all\n").confirm_phrase("DELETE_ALL").unwrap());
        assert!(!prompter("").confirm_phrase("DELETE_ALL").unwrap());
    }

    #[test]
    fn test_ask_with_default() {
        assert_eq!(prompter("\n").ask_with_default("Title", "Assessment").unwrap(), "Assessment");
        assert_eq!(prompter("Quiz 1\n").ask_with_default("Title", "Assessment").unwrap(), "Quiz 1");
    }
}
