use crate::catalog::{Article, VocabularyWord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub is_correct: bool,
    /// `None` when the article was not part of the question.
    pub article_correct: Option<bool>,
    pub translation_correct: bool,
}

/// Grade one answer. Only the primary translation counts as correct.
/// With `requires_article` off (word has no article, or article guessing is
/// disabled) the chosen article is ignored entirely.
pub fn evaluate_answer(
    word: &VocabularyWord,
    chosen_article: Option<Article>,
    chosen_translation: &str,
    requires_article: bool,
) -> Evaluation {
    let translation_correct = chosen_translation == word.primary_translation();

    if !requires_article {
        return Evaluation {
            is_correct: translation_correct,
            article_correct: None,
            translation_correct,
        };
    }

    let article_correct = chosen_article == Some(word.article);
    Evaluation {
        is_correct: article_correct && translation_correct,
        article_correct: Some(article_correct),
        translation_correct,
    }
}

/// Whether a round for `word` asks for the article, given the user's
/// article-guessing preference.
pub fn requires_article(word: &VocabularyWord, guess_articles: bool) -> bool {
    guess_articles && word.has_article()
}
