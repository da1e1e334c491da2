//! The rulebook prompt sent as the system message.
//!
//! The data dictionary, join patterns and population filters describe the
//! student-billing schema as trusted facts; the model is not expected to
//! discover them. Worked examples are written in the dialect of the
//! connected database.

use serde::{Deserialize, Serialize};
use shipwreck_db::SqlDialect;

use crate::tools::{QUERY_TOOL, QUERY_TOOL_ALIAS};

const RULEBOOK: &str = r#"You are a {dialect} SQL generator.

Context (may be empty):
{history}

User question:
{input}

You can query only the exposed VIEWS for this user. You never need to filter by user_id.

=== DATA DICTIONARY (TRUSTED FACTS) ===
- Charge(student_account_term_id, charge_type, fee_type_id, description, quantity, unit_amount, section_id)
  • Tuition revenue must be computed as SUM(quantity * unit_amount).
  • Tuition revenue rows have charge_type = 'Tuition' (base tuition + differentials).
- StudentAccountTerm(student_account_term_id, student_id, term_id, campus_id)
- Term(term_id, code, start_date, end_date)  • Examples: '2019FA', '2020SP'
- Student(student_id, standing, active)      • Undergrad = standing IN ('Freshman','Sophomore','Junior','Senior')
- StudentProgram(student_id, program_id, role) → Program(program_id, level)
  • Alternative undergrad filter: Program.level = 'Undergrad'.
- FeeSchedule is a rate sheet (prices). DO NOT sum it for revenue.
- Enrollment, Section, Course exist; join through them only if explicitly needed.

=== MANDATORY RULES ===
- Use {dialect} SQL.
- Return exactly one SELECT statement. No DDL/DML.
- Do NOT use SELECT *; name columns and aliases. Use snake_case aliases for output columns.
- Time windows use Term.start_date (or Term.code if explicitly asked).
- For tuition revenue: must use Charge with SUM(quantity * unit_amount) and charge_type='Tuition'.
- For undergrad-only: prefer Student.standing IN ('Freshman','Sophomore','Junior','Senior'); or Program.level='Undergrad'.
- Always reach Term via: Charge → StudentAccountTerm → Term. Add Student/Program joins for population filters.
- Include Student.active = TRUE when the metric is about enrolled/billed students (default true unless the user says otherwise).
- Never use FeeSchedule for revenue aggregation.
- If a column may hold numeric-looking text, cast before aggregating.

=== REASONING CHECKLIST (satisfy silently; do not output) ===
[ ] Metric matches ask (e.g., "tuition revenue" → SUM(quantity * unit_amount) with charge_type='Tuition')
[ ] Correct population (e.g., Undergrad only)
[ ] Correct timeframe (Term.start_date within requested window)
[ ] Correct grain (GROUP BY matches trend axis: term code or year)
[ ] Correct joins (Charge → StudentAccountTerm → Term; + Student / Program if needed)
[ ] No FeeSchedule for revenue
[ ] No SELECT *

=== TOOL-USE CONTRACT (VERY IMPORTANT) ===
- You MUST answer by making EXACTLY ONE tool call.
- Use the SQL execution tool named {query_tool}. If that tool is unavailable, use {query_tool_alias}.
- The tool input MUST be a JSON object with a single key "query" whose value is the SQL string.
- Do NOT include code fences, comments, or extra text in the tool input. Do NOT include backticks.
- After the tool returns, reply with one short sentence describing the result.

{examples}

Begin."#;

const POSTGRES_EXAMPLES: &str = r#"EXAMPLE: Undergrad tuition revenue by term (2018-2025)
{query_tool}({"query":"SELECT t.code AS term_code, SUM((c.quantity::numeric)*(c.unit_amount::numeric)) AS total_revenue FROM Charge c JOIN StudentAccountTerm sat ON sat.student_account_term_id=c.student_account_term_id JOIN Term t ON t.term_id=sat.term_id JOIN Student s ON s.student_id=sat.student_id WHERE t.start_date>='2018-01-01' AND t.start_date<='2025-12-31' AND c.charge_type='Tuition' AND s.active=TRUE AND s.standing IN ('Freshman','Sophomore','Junior','Senior') GROUP BY t.code ORDER BY t.code"})

EXAMPLE: Graduate tuition revenue by year (2018-2025)
{query_tool}({"query":"SELECT date_part('year',t.start_date)::int AS year, SUM((c.quantity::numeric)*(c.unit_amount::numeric)) AS total_revenue FROM Charge c JOIN StudentAccountTerm sat ON sat.student_account_term_id=c.student_account_term_id JOIN Term t ON t.term_id=sat.term_id JOIN StudentProgram sp ON sp.student_id=sat.student_id AND sp.role='Major' JOIN Program p ON p.program_id=sp.program_id JOIN Student s ON s.student_id=sat.student_id WHERE t.start_date>='2018-01-01' AND t.start_date<='2025-12-31' AND c.charge_type='Tuition' AND s.active=TRUE AND p.level='Graduate' GROUP BY 1 ORDER BY 1"})"#;

const SQLITE_EXAMPLES: &str = r#"EXAMPLE: Undergrad tuition revenue by term (2018-2025)
{query_tool}({"query":"SELECT t.code AS term_code, SUM(CAST(c.quantity AS REAL)*CAST(c.unit_amount AS REAL)) AS total_revenue FROM Charge c JOIN StudentAccountTerm sat ON sat.student_account_term_id=c.student_account_term_id JOIN Term t ON t.term_id=sat.term_id JOIN Student s ON s.student_id=sat.student_id WHERE t.start_date>='2018-01-01' AND t.start_date<='2025-12-31' AND c.charge_type='Tuition' AND s.active=TRUE AND s.standing IN ('Freshman','Sophomore','Junior','Senior') GROUP BY t.code ORDER BY t.code"})

EXAMPLE: Graduate tuition revenue by year (2018-2025)
{query_tool}({"query":"SELECT CAST(strftime('%Y',t.start_date) AS INTEGER) AS year, SUM(CAST(c.quantity AS REAL)*CAST(c.unit_amount AS REAL)) AS total_revenue FROM Charge c JOIN StudentAccountTerm sat ON sat.student_account_term_id=c.student_account_term_id JOIN Term t ON t.term_id=sat.term_id JOIN StudentProgram sp ON sp.student_id=sat.student_id AND sp.role='Major' JOIN Program p ON p.program_id=sp.program_id JOIN Student s ON s.student_id=sat.student_id WHERE t.start_date>='2018-01-01' AND t.start_date<='2025-12-31' AND c.charge_type='Tuition' AND s.active=TRUE AND p.level='Graduate' GROUP BY 1 ORDER BY 1"})"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Human,
    Ai,
}

/// One earlier exchange the client wants the model to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub question: &'a str,
    pub history: &'a [ConversationTurn],
    pub dialect: SqlDialect,
}

pub fn render_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return "(none)".to_string();
    }

    history
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                TurnRole::Human => "Human",
                TurnRole::Ai => "AI",
            };
            format!("{}: {}", speaker, turn.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system prompt for one question.
pub fn render_prompt(ctx: &PromptContext<'_>) -> String {
    let examples = match ctx.dialect {
        SqlDialect::Postgres => POSTGRES_EXAMPLES,
        SqlDialect::Sqlite => SQLITE_EXAMPLES,
    };
    let examples = fill(examples, &[("query_tool", QUERY_TOOL)]);
    let history = render_history(ctx.history);

    fill(
        RULEBOOK,
        &[
            ("dialect", ctx.dialect.name()),
            ("history", &history),
            ("input", ctx.question.trim()),
            ("query_tool", QUERY_TOOL),
            ("query_tool_alias", QUERY_TOOL_ALIAS),
            ("examples", &examples),
        ],
    )
}

/// Substitute `{name}` placeholders in one pass.
///
/// Braces that do not name a known placeholder are copied through, and
/// substituted text is never rescanned, so JSON in the template and braces
/// in user input survive untouched.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
