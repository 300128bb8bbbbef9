use crate::estimator::AnalysisResult;

pub const ESTIMATION_FAILED: &str = "Ошибка анализа. Попробуйте снова.";

/// Human-readable condition report sent at the end of a dialog
pub fn render(result: &AnalysisResult) -> String {
    format!(
        "🔍 Результаты анализа:\n\n\
         Общий износ: {:.1}%\n\
         Остаточный ресурс: {:.1}%\n\
         Состояние: {}\n\
         Рекомендация: {}\n\n\
         Для нового анализа введите /start",
        result.wear_percentage,
        result.remaining,
        result.condition.label(),
        result.recommendation
    )
}
