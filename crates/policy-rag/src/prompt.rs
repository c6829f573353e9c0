//! Grounded prompt assembly

use policy_core::RetrievedChunk;

/// Reply the model is told to give when the context does not cover the question
pub const NO_ANSWER_REPLY: &str = "I don't have enough information to answer this question.";

/// Render retrieved chunks as the numbered context block
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    let mut context = String::new();

    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!(
            "\nChunk {}:\n{}\n{}\n---\n",
            i + 1,
            chunk.text,
            chunk.source.as_deref().unwrap_or_default()
        ));
    }

    context
}

/// Wrap the question and context in the answering instructions
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are given the following context information. Use it to answer the user's question accurately.\n\
        If the information needed is not in the context, please say \"{NO_ANSWER_REPLY}\"\n\
        \n\
        Context information:\n\
        ---------------------\n\
        {context}\n\
        ---------------------\n\
        \n\
        Question: {question}\n\
        \n\
        Please provide a comprehensive answer based solely on the context information provided.\n\
        Include references to the policy used to get that answer formatted like this: Policy: Name - (Policy URL). Don't mention the chunk numbers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn retrieved(rank: usize, text: &str, source: Option<&str>) -> RetrievedChunk {
        RetrievedChunk {
            rank,
            id: rank as u64,
            text: text.to_string(),
            source: source.map(str::to_string),
            distance: 0.0,
        }
    }

    #[test]
    fn test_context_format() {
        let context = format_context(&[
            retrieved(0, "Students must attend 80% of classes.", Some("Policy: Attendance")),
            retrieved(1, "Final grades are published online.", None),
        ]);

        assert_eq!(
            context,
            "\nChunk 1:\nStudents must attend 80% of classes.\nPolicy: Attendance\n---\n\
             \nChunk 2:\nFinal grades are published online.\n\n---\n"
        );
        assert!(format_context(&[]).is_empty());
    }

    #[test]
    fn test_prompt_snapshot() {
        let prompt = build_prompt("What is the attendance policy?", "CONTEXT");

        assert_snapshot!(prompt, @r###"
        You are given the following context information. Use it to answer the user's question accurately.
        If the information needed is not in the context, please say "I don't have enough information to answer this question."

        Context information:
        ---------------------
        CONTEXT
        ---------------------

        Question: What is the attendance policy?

        Please provide a comprehensive answer based solely on the context information provided.
        Include references to the policy used to get that answer formatted like this: Policy: Name - (Policy URL). Don't mention the chunk numbers.
        "###);
    }
}
