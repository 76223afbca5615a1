#![forbid(unsafe_code)]

//! Semantic simplification of raw edit scripts.
//!
//! A character-level differencer happily produces single-character
//! fragments that are technically minimal but visually noisy. This module
//! reshapes a script into larger, human-meaningful change spans:
//!
//! 1. **merge** - coalesce adjacent same-tag operations, order each edit
//!    hunk delete-before-insert, and factor common prefixes/suffixes of a
//!    delete/insert pair into the neighboring equalities;
//! 2. **short-equality elimination** - an equality flanked by edits is
//!    dissolved into a delete+insert pair when it is no longer than the
//!    larger edit run on each side;
//! 3. **boundary alignment** - a single edit between two equalities slides
//!    to the position with the best semantic score (blank line > line
//!    break > sentence end > whitespace > non-alphanumeric), ties going to
//!    the rightmost candidate.
//!
//! Every pass preserves the reconstruction invariant: the cleaned script
//! still rebuilds both source texts exactly. The whole pipeline is pure
//! and deterministic.

use crate::script::{OpTag, ScriptOp};

/// Simplify a raw edit script into readable change spans.
#[must_use]
pub fn semantic_cleanup(ops: Vec<ScriptOp>) -> Vec<ScriptOp> {
    let mut ops = merge_ops(ops);
    while eliminate_short_equalities(&mut ops) {
        ops = merge_ops(ops);
    }
    align_edit_boundaries(&mut ops);
    merge_ops(ops)
}

/// Byte length of the common prefix of `a` and `b`, on char boundaries.
fn common_prefix_bytes(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut ai = a.chars();
    let mut bi = b.chars();
    loop {
        match (ai.next(), bi.next()) {
            (Some(x), Some(y)) if x == y => len += x.len_utf8(),
            _ => return len,
        }
    }
}

/// Byte length of the common suffix of `a` and `b`, on char boundaries.
fn common_suffix_bytes(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut ai = a.chars().rev();
    let mut bi = b.chars().rev();
    loop {
        match (ai.next(), bi.next()) {
            (Some(x), Some(y)) if x == y => len += x.len_utf8(),
            _ => return len,
        }
    }
}

/// Emit accumulated delete/insert text, factoring shared affixes.
///
/// The shared prefix joins the preceding equality (created if absent);
/// the shared suffix is pushed onto the front of `next_equal`.
fn flush_edits(out: &mut Vec<ScriptOp>, del: &mut String, ins: &mut String, next_equal: &mut String) {
    if !del.is_empty() && !ins.is_empty() {
        let p = common_prefix_bytes(del, ins);
        if p > 0 {
            let prefix = &del[..p];
            match out.last_mut() {
                Some(last) if last.tag == OpTag::Equal => last.text.push_str(prefix),
                _ => out.push(ScriptOp::new(OpTag::Equal, prefix)),
            }
            *del = del[p..].to_string();
            *ins = ins[p..].to_string();
        }
        let s = common_suffix_bytes(del, ins);
        if s > 0 {
            let suffix = del[del.len() - s..].to_string();
            del.truncate(del.len() - s);
            ins.truncate(ins.len() - s);
            next_equal.insert_str(0, &suffix);
        }
    }
    if !del.is_empty() {
        out.push(ScriptOp::new(OpTag::Delete, std::mem::take(del)));
    }
    if !ins.is_empty() {
        out.push(ScriptOp::new(OpTag::Insert, std::mem::take(ins)));
    }
}

/// Coalesce a script: drop empty operations, merge same-tag neighbors,
/// and normalize every edit hunk to delete-then-insert with shared
/// affixes moved into the surrounding equalities.
#[must_use]
pub fn merge_ops(ops: Vec<ScriptOp>) -> Vec<ScriptOp> {
    let mut out: Vec<ScriptOp> = Vec::with_capacity(ops.len());
    let mut del = String::new();
    let mut ins = String::new();

    for op in ops {
        if op.text.is_empty() {
            continue;
        }
        match op.tag {
            OpTag::Delete => del.push_str(&op.text),
            OpTag::Insert => ins.push_str(&op.text),
            OpTag::Equal => {
                let mut eq = op.text;
                flush_edits(&mut out, &mut del, &mut ins, &mut eq);
                match out.last_mut() {
                    Some(last) if last.tag == OpTag::Equal => last.text.push_str(&eq),
                    _ => out.push(ScriptOp::new(OpTag::Equal, eq)),
                }
            }
        }
    }

    let mut trailing = String::new();
    flush_edits(&mut out, &mut del, &mut ins, &mut trailing);
    if !trailing.is_empty() {
        match out.last_mut() {
            Some(last) if last.tag == OpTag::Equal => last.text.push_str(&trailing),
            _ => out.push(ScriptOp::new(OpTag::Equal, trailing)),
        }
    }

    out
}

/// Dissolve equalities that are shorter than the edits flanking them.
///
/// Returns `true` when the script changed; the caller re-merges and may
/// run the pass again until it reaches a fixpoint.
fn eliminate_short_equalities(ops: &mut Vec<ScriptOp>) -> bool {
    let mut changed = false;
    // Indices of candidate equalities still under consideration.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // Insert/delete char counts before and after the candidate.
    let mut ins_before = 0usize;
    let mut del_before = 0usize;
    let mut ins_after = 0usize;
    let mut del_after = 0usize;

    let mut i = 0;
    while i < ops.len() {
        if ops[i].tag == OpTag::Equal {
            equalities.push(i);
            ins_before = ins_after;
            del_before = del_after;
            ins_after = 0;
            del_after = 0;
            last_equality = Some(i);
        } else {
            let char_len = ops[i].text.chars().count();
            if ops[i].tag == OpTag::Insert {
                ins_after += char_len;
            } else {
                del_after += char_len;
            }
            if let Some(eq_idx) = last_equality {
                let eq_len = ops[eq_idx].text.chars().count();
                if eq_len <= ins_before.max(del_before) && eq_len <= ins_after.max(del_after) {
                    let text = ops[eq_idx].text.clone();
                    ops[eq_idx] = ScriptOp::new(OpTag::Delete, text.clone());
                    ops.insert(eq_idx + 1, ScriptOp::new(OpTag::Insert, text));
                    changed = true;
                    equalities.pop();
                    // The previous equality needs re-evaluation too.
                    equalities.pop();
                    last_equality = None;
                    ins_before = 0;
                    del_before = 0;
                    ins_after = 0;
                    del_after = 0;
                    match equalities.last() {
                        Some(&idx) => i = idx,
                        None => {
                            i = 0;
                            continue;
                        }
                    }
                }
            }
        }
        i += 1;
    }
    changed
}

/// Score a boundary between `one` and `two`; higher is more natural.
///
/// 6 - edge of the text; 5 - blank line; 4 - line break; 3 - end of
/// sentence; 2 - whitespace; 1 - non-alphanumeric; 0 - inside a word.
fn semantic_score(one: &str, two: &str) -> u32 {
    let (Some(char1), Some(char2)) = (one.chars().last(), two.chars().next()) else {
        return 6;
    };
    let non_alnum1 = !char1.is_alphanumeric();
    let non_alnum2 = !char2.is_alphanumeric();
    let ws1 = non_alnum1 && char1.is_whitespace();
    let ws2 = non_alnum2 && char2.is_whitespace();
    let line_break1 = ws1 && (char1 == '\n' || char1 == '\r');
    let line_break2 = ws2 && (char2 == '\n' || char2 == '\r');
    let blank_line1 = line_break1 && (one.ends_with("\n\n") || one.ends_with("\n\r\n"));
    let blank_line2 = line_break2
        && ["\n\n", "\n\r\n", "\r\n\n", "\r\n\r\n"]
            .iter()
            .any(|p| two.starts_with(p));

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alnum1 && !ws1 && ws2 {
        3
    } else if ws1 || ws2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Slide single edits between equalities to the best-scoring boundary.
fn align_edit_boundaries(ops: &mut Vec<ScriptOp>) {
    let mut i = 1;
    while !ops.is_empty() && i + 1 < ops.len() {
        if ops[i - 1].tag == OpTag::Equal
            && ops[i + 1].tag == OpTag::Equal
            && ops[i].tag != OpTag::Equal
        {
            let mut eq1 = ops[i - 1].text.clone();
            let mut edit = ops[i].text.clone();
            let mut eq2 = ops[i + 1].text.clone();

            // First shift the edit as far left as it will go.
            let s = common_suffix_bytes(&eq1, &edit);
            if s > 0 {
                let common = edit[edit.len() - s..].to_string();
                eq1.truncate(eq1.len() - s);
                edit.truncate(edit.len() - s);
                edit.insert_str(0, &common);
                eq2.insert_str(0, &common);
            }

            // Then step right one char at a time, keeping the best score.
            let mut best_eq1 = eq1.clone();
            let mut best_edit = edit.clone();
            let mut best_eq2 = eq2.clone();
            let mut best_score = semantic_score(&eq1, &edit) + semantic_score(&edit, &eq2);
            loop {
                let (Some(e_first), Some(q_first)) = (edit.chars().next(), eq2.chars().next())
                else {
                    break;
                };
                if e_first != q_first {
                    break;
                }
                eq1.push(e_first);
                edit.remove(0);
                edit.push(q_first);
                eq2 = eq2[q_first.len_utf8()..].to_string();
                let score = semantic_score(&eq1, &edit) + semantic_score(&edit, &eq2);
                // >= keeps the rightmost of equally scored positions.
                if score >= best_score {
                    best_score = score;
                    best_eq1 = eq1.clone();
                    best_edit = edit.clone();
                    best_eq2 = eq2.clone();
                }
            }

            if ops[i - 1].text != best_eq1 {
                if best_eq1.is_empty() {
                    ops.remove(i - 1);
                    i -= 1;
                } else {
                    ops[i - 1].text = best_eq1;
                }
                ops[i].text = best_edit;
                if best_eq2.is_empty() {
                    ops.remove(i + 1);
                    i -= 1;
                } else {
                    ops[i + 1].text = best_eq2;
                }
            }
        }
        i += 1;
    }
}
