//! Candidate string generation
//!
//! OCR regularly splits one physical sign into several detections. For every
//! cluster of co-located tokens this module synthesizes merged strings so
//! the resolver gets a chance to see the sign as a whole. Pairs are built in
//! both orders because word order in the source frame is unpredictable.

/// Expand a frame's tokens into the final candidate list
///
/// Keeps every original token, then adds per cluster: the member tokens
/// again, every ordered pair of distinct members joined by a space (each
/// variant at most once) and the whole-cluster join when it is new. After
/// all clusters one whole-frame join over every token is added. Candidates
/// shorter than `min_length` characters are dropped at the end.
pub fn candidate_strings(strings: &[String], labels: &[i32], min_length: usize) -> Vec<String> {
    let cluster_count = labels
        .iter()
        .copied()
        .max()
        .map_or(0, |max_label| max_label + 1);

    let mut generated: Vec<String> = Vec::new();
    for cluster_nr in 0..cluster_count {
        let members: Vec<&str> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == cluster_nr)
            .map(|(index, _)| strings[index].as_str())
            .collect();

        let mut in_cluster: Vec<String> = members.iter().map(|s| s.to_string()).collect();
        for &e1 in &members {
            for &e2 in &members {
                if e1 != e2 {
                    let mutation = format!("{} {}", e1, e2);
                    if !in_cluster.contains(&mutation) {
                        in_cluster.push(mutation);
                    }
                }
            }
        }

        let combined = members.join(" ");
        if !in_cluster.contains(&combined) {
            in_cluster.push(combined);
        }
        generated.extend(in_cluster);
    }
    generated.push(strings.join(" "));

    let mut candidates: Vec<String> = strings.to_vec();
    candidates.extend(generated);
    candidates.retain(|s| s.chars().count() >= min_length);
    candidates
}
