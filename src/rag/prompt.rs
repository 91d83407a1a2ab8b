//! Prompt templates and the built-in example queries.

/// Question → Cypher pairs shown to the model with every translation.
pub const DEFAULT_EXAMPLES: [&str; 2] = [
    "USER INPUT: 'What is the ATC code of the drug with item code 200710605?' \
     QUERY: MATCH (d:Drug)-[:CATEGORIZED_AS]->(a:ATC) WHERE d.code = 200710605 RETURN a.code",
    "USER INPUT: 'Tell me the dosage of Amoranic Tablet 625mg.' \
     QUERY: MATCH (d:Drug)-[:HAS_DOSAGE]->(dosage:Dosage) WHERE d.name = 'Amoranic Tablet 625mg' \
     RETURN dosage.description",
];

pub fn default_examples() -> Vec<String> {
    DEFAULT_EXAMPLES.iter().map(|e| e.to_string()).collect()
}

pub const ANSWER_SYSTEM_INSTRUCTION: &str = "Answer the user question using the provided context.";

/// Prompt asking the model for a single Cypher statement.
pub fn text2cypher_prompt(schema: &str, examples: &[String], question: &str) -> String {
    format!(
        "Task: Generate a Cypher statement for querying a Neo4j graph database from a user input.\n\
         \n\
         Schema:\n\
         {schema}\n\
         \n\
         Examples (optional):\n\
         {examples}\n\
         \n\
         Input:\n\
         {question}\n\
         \n\
         Do not use any properties or relationships not included in the schema.\n\
         Do not include triple backticks ``` or any additional text except the generated Cypher statement in your response.\n\
         \n\
         Cypher query:\n",
        examples = examples.join("\n"),
    )
}

/// Prompt asking the model to answer from retrieved records.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Context:\n\
         {context}\n\
         \n\
         Examples:\n\
         \n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}
