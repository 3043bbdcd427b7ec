use super::{ContractDraft, EmploymentType, Role, StatementOfWork};
use crate::config::Letterhead;
use crate::export::{escape_letterhead, escape_text};
use crate::invoice::long_date;

pub const INVALID_COMBINATION: &str = "Please select a valid role and employment type combination.";

/// Role-specific text of a statement of work. Everything else comes from the
/// shared template in `render_clause_set`.
#[derive(Debug, PartialEq)]
pub struct ClauseSet {
    pub role: Role,
    pub employment_type: EmploymentType,
    pub responsibilities: &'static [&'static str],
    pub deliverables: &'static [&'static str],
}

impl ClauseSet {
    /// e.g. "Full-Time Developer"
    pub fn title(&self) -> String {
        format!("{} {}", self.employment_type.title(), self.role)
    }
}

static CLAUSE_SETS: [ClauseSet; 2] = [
    ClauseSet {
        role: Role::Developer,
        employment_type: EmploymentType::FullTime,
        responsibilities: &[
            "Develop and maintain web applications using specified technologies",
            "Implement responsive and accessible user interfaces",
            "Collaborate with designers to translate designs into functional code",
            "Optimize application performance and scalability",
            "Conduct code reviews and implement best practices",
            "Troubleshoot and debug issues as they arise",
            "Stay updated with the latest trends and technologies in web development",
        ],
        deliverables: &[
            "Functional web applications and features",
            "Code documentation",
            "Technical specifications and architecture documents",
        ],
    },
    ClauseSet {
        role: Role::Designer,
        employment_type: EmploymentType::PartTime,
        responsibilities: &[
            "Create user-centered designs for web and mobile applications",
            "Develop brand identities and design systems",
            "Produce high-fidelity mockups and prototypes",
            "Conduct user research and usability testing",
            "Collaborate with developers to ensure design feasibility",
            "Create and maintain design documentation",
            "Stay current with design trends and best practices in UI/UX",
        ],
        deliverables: &[
            "UI/UX designs and prototypes",
            "Brand identity assets",
            "Design systems and style guides",
            "User research reports",
            "Design documentation",
        ],
    },
];

/// The clause set for a role and employment type, if one is defined.
pub fn select_clause_set(role: Role, employment_type: EmploymentType) -> Option<&'static ClauseSet> {
    CLAUSE_SETS
        .iter()
        .find(|set| set.role == role && set.employment_type == employment_type)
}

fn bullets(content: &mut String, items: &[&str]) {
    for item in items {
        content.push_str(&format!("- {}\n", item));
    }
    content.push('\n');
}

fn render_clause_set(
    content: &mut String,
    clauses: &ClauseSet,
    draft: &ContractDraft,
    letterhead: &Letterhead,
) {
    let sow = &draft.sow;
    let date = long_date(draft.agreement_date);
    let title = clauses.title();

    content.push_str(&format!("## STATEMENT OF WORK (SOW) - {}\n\n", title));
    content.push_str(&format!(
        "This Statement of Work (\"SOW\") is entered into on {} pursuant to the General Services \
         Agreement dated {} between {} (\"Service Provider\") and {} (\"Client\").\n\n",
        date, date, letterhead.name, draft.client_name
    ));

    content.push_str("### 1. RESOURCE DETAILS\n\n");
    bullets(content, &[
        format!("Role: {}", title).as_str(),
        format!("Skills: {}", sow.skills).as_str(),
        format!("Commitment: {} ({} hours per week)", clauses.employment_type, sow.hours_per_week).as_str(),
        format!("Rate: ${} USD per hour", sow.rate).as_str(),
    ]);

    content.push_str("### 2. RESPONSIBILITIES\n\n");
    bullets(content, clauses.responsibilities);

    content.push_str("### 3. TIMELINE\n\n");
    bullets(content, &[
        format!("Start Date: {}", sow.start_date_display()).as_str(),
        "End Date: Ongoing",
    ]);

    content.push_str("### 4. DELIVERABLES\n\n");
    content.push_str(
        "Deliverables will vary based on the specific tasks and projects assigned. \
         These may include but are not limited to:\n\n",
    );
    bullets(content, clauses.deliverables);

    content.push_str("### 5. COMPENSATION\n\n");
    bullets(content, &[
        format!("Hourly Rate: ${} USD per hour", sow.rate).as_str(),
        format!("Hours per Week: {} hours", sow.hours_per_week).as_str(),
        "Payment Schedule: Bi-weekly invoicing based on actual hours worked",
        "Invoicing: Every two weeks, Service Provider will invoice for the actual hours worked during that period",
    ]);

    content.push_str("### 6. ADDITIONAL TERMS\n\n");
    content.push_str(&format!(
        "6.1 Hours Commitment: The {} hours per week are a general commitment, but actual billable \
         hours may vary based on the number of working days in each bi-weekly period.\n\n",
        sow.hours_per_week
    ));
    content.push_str(&format!(
        "6.2 Overtime: Any hours worked beyond {} hours/week must be pre-approved by the Client and \
         will be billed at the same hourly rate.\n\n",
        sow.hours_per_week
    ));
    content.push_str(
        "6.3 Expenses: Any project-related expenses must be pre-approved by the Client and will be \
         billed at cost.\n\n",
    );
}

fn render_sow_summary(content: &mut String, sow: &StatementOfWork) {
    content.push_str("## Statement of Work (SOW)\n\n");
    content.push_str(&format!("**Role:** {}<br>\n", sow.role));
    content.push_str(&format!("**Employment Type:** {}<br>\n", sow.employment_type));
    content.push_str(&format!("**Skills:** {}<br>\n", sow.skills));
    content.push_str(&format!("**Start Date:** {}<br>\n", sow.start_date_display()));
    content.push_str(&format!("**Rate:** ${} USD per hour<br>\n", sow.rate));
    content.push_str(&format!("**Hours per Week:** {}<br>\n", sow.hours_per_week));
    content.push_str("**Responsibilities:**\n\n");
    content.push_str(&format!("{}\n\n", sow.responsibilities));
}

fn render_signatures(content: &mut String, client_name: &str, letterhead: &Letterhead) {
    content.push_str("<div style=\"display: flex; justify-content: space-between;\">\n");
    for party in [client_name, letterhead.name.as_str()] {
        content.push_str("<div>\n");
        content.push_str(&format!("{}<br>\n", party));
        content.push_str("By: ________________________<br>\n");
        content.push_str("Name:<br>\nTitle:<br>\nDate:\n");
        content.push_str("</div>\n");
    }
    content.push_str("</div>\n\n");
}

// Copy of the draft with every typed-in field made safe to print
fn escaped(draft: &ContractDraft) -> ContractDraft {
    ContractDraft {
        agreement_date: draft.agreement_date,
        client_name: escape_text(&draft.client_name),
        client_address: escape_text(&draft.client_address),
        sow: StatementOfWork {
            skills: escape_text(&draft.sow.skills),
            rate: escape_text(&draft.sow.rate),
            hours_per_week: escape_text(&draft.sow.hours_per_week),
            responsibilities: escape_text(&draft.sow.responsibilities),
            ..draft.sow.clone()
        },
    }
}

/// The full contract: services agreement, SOW summary and the selected clause set.
pub fn render_contract_markdown(draft: &ContractDraft, letterhead: &Letterhead) -> String {
    let draft = &escaped(draft);
    let letterhead = &escape_letterhead(letterhead);
    let date = long_date(draft.agreement_date);
    let provider = &letterhead.name;
    let jurisdiction = &letterhead.jurisdiction;
    let mut content = String::new();

    content.push_str("# General Services Agreement\n\n");
    content.push_str(&format!(
        "This General Services Agreement (the \"Agreement\") is entered into on {} by and between:\n\n",
        date
    ));
    content.push_str(&format!(
        "**{}**, a company organized and existing under the laws of {}, with its principal place \
         of business at {} (\"Service Provider\")\n\n",
        provider, letterhead.location, letterhead.address
    ));
    content.push_str("and\n\n");
    content.push_str(&format!(
        "**{}**, a company organized and existing under the laws of [Client's State/Country], with \
         its principal place of business at {} (\"Client\")\n\n",
        draft.client_name, draft.client_address
    ));
    content.push_str("(each a \"Party\" and collectively the \"Parties\").\n\n");

    let sections: [(&str, Vec<String>); 10] = [
        ("1. SERVICES", vec![
            "1.1 Service Provider agrees to provide Client with design and development services as outlined in one or more Statements of Work (\"SOW\") to be attached to this Agreement (the \"Services\").".to_string(),
            "1.2 Each SOW shall ideally include:".to_string(),
            "a) A description of the Services to be performed".to_string(),
            "b) The timeline for completion of the Services (If a fixed time project)".to_string(),
            "c) The fees for the Services".to_string(),
            "d) Any deliverables to be provided".to_string(),
            "e) Any other terms specific to the engagement".to_string(),
            "1.3 Each SOW shall be governed by the terms of this Agreement unless explicitly stated otherwise in the SOW.".to_string(),
        ]),
        ("2. TERM AND TERMINATION", vec![
            format!("2.1 This Agreement shall commence on {} and continue until terminated by either Party with 10 days' written notice.", date),
            "2.2 Termination of this Agreement will not affect any SOWs in progress, which shall continue until completed unless otherwise agreed by the Parties.".to_string(),
        ]),
        ("3. PAYMENT", vec![
            "3.1 Client agrees to pay Service Provider for the Services as specified in each SOW.".to_string(),
            "3.2 Invoices will be submitted bi-weekly and are due within 7 days of receipt.".to_string(),
            "3.3 Late payments shall bear interest at the rate of 1.5% per month.".to_string(),
        ]),
        ("4. INDEPENDENT CONTRACTOR", vec![
            "4.1 Service Provider is an independent contractor. Nothing in this Agreement shall be construed as creating an employer-employee relationship.".to_string(),
        ]),
        ("5. CONFIDENTIALITY", vec![
            "5.1 Each Party agrees to keep confidential all non-public information disclosed by the other Party in connection with this Agreement.".to_string(),
        ]),
        ("6. INTELLECTUAL PROPERTY", vec![
            "6.1 Any pre-existing intellectual property shall remain the property of its owner.".to_string(),
            "6.2 Intellectual property created specifically for Client as part of the Services shall be owned by Client upon full payment.".to_string(),
        ]),
        ("7. LIMITATION OF LIABILITY", vec![
            "7.1 Neither Party shall be liable for any indirect, incidental, special, or consequential damages arising out of or in connection with this Agreement.".to_string(),
            "7.2 Service Provider's total liability under this Agreement shall not exceed the amount paid by Client for the Services.".to_string(),
        ]),
        ("8. GOVERNING LAW AND JURISDICTION", vec![
            format!("8.1 This Agreement shall be governed by and construed in accordance with the laws of {}.", jurisdiction),
            format!("8.2 Any disputes arising from this Agreement shall be subject to the exclusive jurisdiction of the courts of {}.", jurisdiction),
        ]),
        ("9. ENTIRE AGREEMENT", vec![
            "9.1 This Agreement, together with any SOWs, constitutes the entire agreement between the Parties and supersedes all prior agreements and understandings, whether written or oral.".to_string(),
        ]),
        ("10. AMENDMENTS", vec![
            "10.1 This Agreement may only be amended in writing signed by both Parties.".to_string(),
        ]),
    ];

    for (heading, paragraphs) in &sections {
        content.push_str(&format!("## {}\n\n", heading));
        for paragraph in paragraphs {
            content.push_str(&format!("{}\n\n", paragraph));
        }
    }

    content.push_str(
        "IN WITNESS WHEREOF, the Parties have executed this Agreement as of the date first above written.\n\n",
    );
    render_signatures(&mut content, &draft.client_name, letterhead);

    render_sow_summary(&mut content, &draft.sow);

    match select_clause_set(draft.sow.role, draft.sow.employment_type) {
        Some(clauses) => render_clause_set(&mut content, clauses, draft, letterhead),
        None => content.push_str(&format!("{}\n\n", INVALID_COMBINATION)),
    }

    render_signatures(&mut content, &draft.client_name, letterhead);

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CLAUSE_HEADINGS: [&str; 6] = [
        "1. RESOURCE DETAILS",
        "2. RESPONSIBILITIES",
        "3. TIMELINE",
        "4. DELIVERABLES",
        "5. COMPENSATION",
        "6. ADDITIONAL TERMS",
    ];

    fn draft(role: Role, employment_type: EmploymentType) -> ContractDraft {
        let mut draft = ContractDraft::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        draft.client_name = "Acme".to_string();
        draft.client_address = "1 Main St".to_string();
        draft.sow.role = role;
        draft.sow.employment_type = employment_type;
        draft.sow.skills = "Rust, TypeScript".to_string();
        draft.sow.rate = "80".to_string();
        draft.sow.hours_per_week = "40".to_string();
        draft.sow.start_date = NaiveDate::from_ymd_opt(2025, 4, 1);
        draft
    }

    #[test]
    fn only_two_combinations_have_clause_sets() {
        assert!(select_clause_set(Role::Developer, EmploymentType::FullTime).is_some());
        assert!(select_clause_set(Role::Designer, EmploymentType::PartTime).is_some());
        assert!(select_clause_set(Role::Designer, EmploymentType::FullTime).is_none());
        assert!(select_clause_set(Role::Developer, EmploymentType::PartTime).is_none());
    }

    #[test]
    fn full_time_developer_clauses() {
        let contract = render_contract_markdown(
            &draft(Role::Developer, EmploymentType::FullTime),
            &Letterhead::default(),
        );

        assert!(contract.contains("STATEMENT OF WORK (SOW) - Full-Time Developer"));
        assert!(contract.contains("- Role: Full-Time Developer"));
        assert!(contract.contains("- Commitment: Full-time (40 hours per week)"));
        assert!(contract.contains("- Rate: $80 USD per hour"));
        assert!(contract.contains("- Start Date: 2025-04-01"));
        assert!(contract.contains("Optimize application performance and scalability"));
        assert!(!contract.contains("Brand identity assets"));
        assert!(!contract.contains(INVALID_COMBINATION));
    }

    #[test]
    fn part_time_designer_clauses() {
        let contract = render_contract_markdown(
            &draft(Role::Designer, EmploymentType::PartTime),
            &Letterhead::default(),
        );

        assert!(contract.contains("Part-Time Designer"));
        assert!(contract.contains("- Commitment: Part-time (40 hours per week)"));
        assert!(contract.contains("Brand identity assets"));
        assert!(!contract.contains("Code documentation"));
    }

    #[test]
    fn both_clause_sets_share_the_same_sections() {
        for (role, employment_type) in [
            (Role::Developer, EmploymentType::FullTime),
            (Role::Designer, EmploymentType::PartTime),
        ] {
            let contract = render_contract_markdown(&draft(role, employment_type), &Letterhead::default());
            let positions: Vec<usize> = CLAUSE_HEADINGS
                .iter()
                .map(|heading| contract.find(&format!("### {}", heading)).expect(heading))
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn other_combinations_render_the_placeholder_only() {
        let contract = render_contract_markdown(
            &draft(Role::Designer, EmploymentType::FullTime),
            &Letterhead::default(),
        );

        assert!(contract.contains(INVALID_COMBINATION));
        assert!(!contract.contains("STATEMENT OF WORK (SOW) -"));
        for heading in CLAUSE_HEADINGS {
            assert!(!contract.contains(&format!("### {}", heading)));
        }
    }

    #[test]
    fn agreement_names_both_parties_and_the_date() {
        let contract = render_contract_markdown(
            &draft(Role::Developer, EmploymentType::FullTime),
            &Letterhead::default(),
        );

        assert!(contract.starts_with("# General Services Agreement"));
        assert!(contract.contains("entered into on March 3, 2025 by and between"));
        assert!(contract.contains("**Value at Void LLC**"));
        assert!(contract.contains("**Acme**"));
        assert!(contract.contains("principal place of business at 1 Main St"));
        assert!(contract.contains("laws of Dubai, United Arab Emirates."));
        assert_eq!(contract.matches("By: ________________________").count(), 4);
    }

    #[test]
    fn typed_text_is_escaped_in_the_contract() {
        let mut draft = draft(Role::Developer, EmploymentType::FullTime);
        draft.client_name = "Smith <Sons> & Co".to_string();
        draft.client_address = "Unit #4".to_string();
        draft.sow.skills = "C++ & *Rust*".to_string();
        draft.sow.responsibilities = "<script>ship it</script>".to_string();

        let contract = render_contract_markdown(&draft, &Letterhead::default());

        assert!(contract.contains("**Smith &lt;Sons&gt; &amp; Co**"));
        assert!(contract.contains("Smith &lt;Sons&gt; &amp; Co<br>"));
        assert!(!contract.contains("<Sons>"));
        assert!(contract.contains("principal place of business at Unit \\#4"));
        assert!(contract.contains("**Skills:** C++ &amp; \\*Rust\\*<br>"));
        assert!(contract.contains("&lt;script&gt;ship it&lt;/script&gt;"));
        assert!(!contract.contains("<script>"));
    }

    #[test]
    fn blank_draft_still_renders() {
        let blank = ContractDraft::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let contract = render_contract_markdown(&blank, &Letterhead::default());

        assert!(contract.contains("**Start Date:** <br>"));
        assert!(contract.contains(INVALID_COMBINATION));
    }
}
