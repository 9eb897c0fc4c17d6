//! Prompt templates that drive an assistant through the tools.

pub fn research_prompt(topic: &str, num_papers: usize) -> String {
    format!(
        "Search for {num} academic papers about '{topic}' using the search_papers tool.

Follow these instructions:
1. First, search for papers using search_papers(topic='{topic}', max_results={num})
2. For each paper found, extract and organize the following information:
   - Paper title
   - Authors
   - Publication date
   - Brief summary of the key findings
   - Main contributions or innovations
   - Methodologies used
   - Relevance to the topic '{topic}'

3. Provide a comprehensive summary that includes:
   - Overview of the current state of research in '{topic}'
   - Common themes and trends across the papers
   - Key research gaps or areas for future investigation
   - Most impactful or influential papers in this area

4. Organize your findings in a clear, structured format with headings and bullet points for easy readability.

Please present both detailed information about each paper and a high-level synthesis of the research landscape in {topic}.",
        num = num_papers,
        topic = topic,
    )
}

pub fn fda_prompt(topic: &str, max_results: usize) -> String {
    format!(
        "Search for {max} FDA documents about '{topic}' using the search_fda tool.

Follow these instructions:
1. First, search for FDA information using search_fda(topic='{topic}', max_results={max})
2. For each document found, extract and analyze the following:
   - Document title and type (recall, safety alert, guidance, etc.)
   - Publication or effective date
   - Key findings or announcements
   - Affected products, companies, or populations
   - Recommended actions or precautions
   - Current status (if applicable)
   - Relevance to the topic '{topic}'

3. Provide a comprehensive analysis that includes:
   - Overview of FDA's current position or guidance on '{topic}'
   - Common patterns or trends in the findings
   - Key safety concerns or regulatory considerations
   - Important updates or changes in FDA's approach
   - Recommendations for stakeholders

4. If the search involves recalls or safety alerts:
   - Highlight urgent or active recalls/alerts
   - Summarize the scope and severity of issues
   - List specific products or batches affected
   - Detail required consumer/healthcare provider actions

5. Organize the information in a clear, structured format with:
   - Executive summary
   - Detailed findings by document
   - Timeline of developments
   - Key takeaways and recommendations

Please present both the detailed document information and a high-level analysis of FDA's perspective and actions regarding {topic}.",
        max = max_results,
        topic = topic,
    )
}
