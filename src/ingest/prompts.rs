//! Prompt builders for every analysis the service runs. Kept apart from the
//! orchestrator so the wording can change without touching fallback logic.

pub fn course_description(syllabus_text: &str) -> String {
    format!(
        "The following text was extracted from a course syllabus PDF. \
         Isolate the opening descriptive paragraph(s) that explain what the \
         course is about: its subject, goals, and scope. Return only that \
         descriptive text, with no headings and no commentary. If the \
         syllabus has no such description, return an empty response.\n\n\
         Syllabus text:\n{}",
        syllabus_text
    )
}

pub fn key_dates(syllabus_text: &str) -> String {
    format!(
        "Analyze the following course syllabus text and list every test, \
         exam, assignment, project, and deadline you can find. Format the \
         response as a markdown list, one entry per line, each with the date \
         (if given), the name, and the weight (if specified).\n\n\
         Syllabus text:\n{}",
        syllabus_text
    )
}

pub fn coursework_extraction(syllabus_text: &str) -> String {
    format!(
        "Extract all gradable coursework from the following course syllabus \
         text. Respond with a single JSON object whose keys are the grading \
         category labels used by the syllabus (for example \"assignments\", \
         \"quizzes\", \"midterms\", \"projects\") and whose values are arrays \
         of items. Each item must have: \"name\" (string), \"weight\" \
         (percentage of final grade, number), \"date\" (due date in \
         YYYY-MM-DD format, or null if not given), and \"description\" \
         (string, may be empty). Respond with the JSON object only.\n\n\
         Syllabus text:\n{}",
        syllabus_text
    )
}

pub fn course_summary(description: &str) -> String {
    format!(
        "Generate a comprehensive summary of the following course. Include:\n\
         1. An overview of the main course content\n\
         2. Key learning objectives\n\
         3. Main topics/subjects covered\n\
         4. Skills students will develop\n\
         5. Any notable teaching methods or approaches mentioned\n\n\
         Format the response in a well-structured way with sections and \
         bullet points where appropriate.\n\n{}",
        description
    )
}

pub fn deadlines_from_course(
    code: &str,
    name: &str,
    description: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> String {
    format!(
        "Extract all deadlines and important dates from the following course \
         description. Format the response as a JSON array of objects with \
         date and description properties.\n\
         Course: {} - {}\n\
         Description: {}\n\
         Course starts: {}\n\
         Course ends: {}",
        code,
        name,
        description,
        start_date.unwrap_or("unknown"),
        end_date.unwrap_or("unknown"),
    )
}

pub fn deadlines_from_content(content: &str) -> String {
    format!(
        "Extract all deadlines and important dates from the following text. \
         Format the response as a JSON array of objects with date and \
         description properties.\n\
         Content: {}",
        content
    )
}

pub fn syllabus_analysis(code: &str, name: &str, syllabus_text: &str) -> String {
    format!(
        "Analyze the following course syllabus and provide a summary of the \
         key information including:\n\
         - Course objectives\n\
         - Grading criteria\n\
         - Required materials\n\
         - Weekly schedule\n\
         - Major assignments or projects\n\n\
         Format the response in a well-structured way.\n\n\
         Course: {} - {}\n\
         Syllabus content: {}",
        code, name, syllabus_text
    )
}

pub fn question(context: &str, question: &str) -> String {
    format!(
        "As an educational assistant, please answer the following question \
         from a student. Use the provided course information to give a \
         relevant and helpful response.\n\n{}\n\nStudent question: {}",
        context, question
    )
}
