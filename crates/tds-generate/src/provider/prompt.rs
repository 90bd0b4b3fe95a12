//! Prompt construction.

use tds_model::{QualityLevel, TicketType};

use super::ContentRequest;

const PRIORITY_GUIDE: &str = "\
Priority 1: critical, business operations halted (site network down, all POS offline). Urgent, stressed tone.
Priority 2: major disruption needing quick resolution (one POS down, PC won't boot). Concerned tone.
Priority 3: affects work but nothing is halted (printer issues, new user setup). Matter-of-fact tone.
Priority 4: minimal disruption, can be scheduled (keyboard request, password reset). Polite, non-urgent tone.";

const SUBJECT_RULES: &str = "\
- 3 to 8 words, written the way a user would type it
- no urgency words such as URGENT, CRITICAL or HIGH PRIORITY
- let the body carry urgency, impact and detail";

fn writing_style(quality: QualityLevel) -> &'static str {
    match quality {
        QualityLevel::Basic => {
            "Very casual, like a text message: lowercase, missing punctuation, \
             common typos (cant, wont, plz, asap), run-on sentences, no greeting or sign-off."
        }
        QualityLevel::Realistic => {
            "Everyday language with minor mistakes: contractions, the odd typo, \
             short or run-on sentences, only the detail that matters."
        }
        QualityLevel::Polished => {
            "Professional: correct grammar and punctuation, clear structure, \
             complete sentences with appropriate detail."
        }
    }
}

fn type_guide(ticket_type: TicketType) -> &'static str {
    match ticket_type {
        TicketType::Incident => {
            "Incident: something is broken or not working. Describe the problem and its impact on work."
        }
        TicketType::ServiceRequest => {
            "Service Request: asking for something new or a standard service. State what is needed and why."
        }
    }
}

fn or_general(value: &str) -> &str {
    if value.trim().is_empty() {
        "General"
    } else {
        value
    }
}

/// Build the user prompt for one request.
pub fn build_prompt(request: &ContentRequest) -> String {
    let class = &request.classification;
    let style = writing_style(request.quality);
    let (index, total) = request.position;

    let subject_of_ticket = match request.custom_prompt.as_deref() {
        Some(custom) if !custom.trim().is_empty() => format!(
            "USER INSTRUCTIONS (ticket {index} of {total}; vary the scenario between tickets):\n{}",
            custom.trim()
        ),
        _ => format!(
            "TICKET SPECIFICATIONS:\nCategory: {}\nSub-Category: {}\nItem: {}\nPriority Level: {}\nTicket Type: {}\n\n{}",
            class.category,
            or_general(&class.subcategory),
            or_general(&class.item),
            class.priority,
            class.ticket_type,
            type_guide(class.ticket_type),
        ),
    };

    format!(
        "Generate a realistic IT support ticket email from an end user at a building supplies company.\n\n\
         {subject_of_ticket}\n\n\
         PRIORITY GUIDELINES:\n{PRIORITY_GUIDE}\n\
         Write this ticket as {priority} ({severity}).\n\n\
         SUBJECT LINE RULES:\n{SUBJECT_RULES}\n\n\
         WRITING STYLE: {style}\n\n\
         Use Australian English.\n\n\
         Respond ONLY with JSON in this exact format:\n\
         {{\"subject\": \"email subject here\", \"description\": \"email body here\"}}",
        priority = class.priority,
        severity = class.priority.severity(),
    )
}
