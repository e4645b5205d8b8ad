//! Cosmetic clean-up of KEGG pathway pages so the saved HTML renders the map
//! next to its local PNG without the site chrome.

use regex::Regex;

use crate::error::KeggError;

const DBGET_PATH: &str = "/dbget-bin/www_bget?";
const DBGET_URL: &str = "https://www.genome.jp/dbget-bin/www_bget?";

/// Text markers KEGG uses for a map page that does not exist.
pub fn page_available(body: &str) -> bool {
    !body.contains("does not exist") && body.trim_end().ends_with("</html>")
}

struct RegexStep {
    pattern: Regex,
    replacement: &'static str,
}

impl RegexStep {
    fn new(pattern: &str, replacement: &'static str) -> Result<Self, KeggError> {
        let pattern =
            Regex::new(pattern).map_err(|err| KeggError::InvalidPattern(err.to_string()))?;
        Ok(Self {
            pattern,
            replacement,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

/// Ordered chain of page transforms. Built once per batch and shared by all
/// workers.
pub struct HtmlScrubber {
    steps: Vec<RegexStep>,
}

impl HtmlScrubber {
    pub fn new() -> Result<Self, KeggError> {
        let steps = vec![
            RegexStep::new(r"(?s)\[.+?\]", "")?,
            RegexStep::new(r"(?s)<script.+?</script>", "")?,
            RegexStep::new(r"(?s)<style.+?</style>", "")?,
            RegexStep::new(r"(?s)<link.+?/>[ \n]+", "\n")?,
            RegexStep::new(r"(?s)<table.+?</table>", "")?,
            RegexStep::new(r"(?s)<div.+?</form>", "</div>")?,
            RegexStep::new(r"<body>[ \n]+", "<body>\n<div align=\"center\">\n")?,
        ];
        Ok(Self { steps })
    }

    /// `code` is the map prefix; the image path under it becomes relative.
    pub fn scrub(&self, page: &str, code: &str) -> String {
        let text = self
            .steps
            .iter()
            .fold(page.to_string(), |text, step| step.apply(&text));
        let text = relativize_image(&text, code);
        absolutize_dbget(&text)
    }
}

fn relativize_image(text: &str, code: &str) -> String {
    text.replacen(&format!("/kegg/pathway/{code}/"), "", 1)
}

fn absolutize_dbget(text: &str) -> String {
    text.replace(DBGET_PATH, DBGET_URL)
}
