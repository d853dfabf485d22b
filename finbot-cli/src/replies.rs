//! User-facing texts (Portuguese). Markdown ones use Telegram's legacy
//! `Markdown` parse mode.

use finbot_core::{Expense, Transaction};
use rust_decimal::Decimal;

pub const WELCOME: &str = "🤖 *Bot de Controle Financeiro Familiar*

Olá! Eu sou seu assistente financeiro pessoal.

📝 *Como usar:*

*Para despesas:*
`valor - meio de pagamento - categoria (descrição) - usuário`

*Para créditos:*
`valor - credito`

*Exemplos:*
• `100.50 - Cartão Visa - Alimentação (supermercado) - Maria`
• `50.00 - Dinheiro - Transporte (uber) - João`
• `1500.00 - credito`

💡 *Tipos de transação:*
• *Débitos*: gastos normais com todas as informações
• *Créditos*: entradas de dinheiro (formato simplificado)

📊 *Comandos disponíveis:*
• /start - Mostra esta mensagem
• /statistics - Gera relatórios e gráficos completos
• /clearTable - Limpa todos os dados (cuidado!)

📈 *Relatórios incluem:*
• Resumo financeiro com saldo atual
• Gastos por pessoa (apenas débitos)
• Comparação créditos vs débitos
• Débitos acumulados ao longo do tempo
• Análise por categoria e meio de pagamento

💡 *Dicas:*
- O valor pode usar vírgula ou ponto
- Não é obrigatório incluir centavos
- Para despesas, mantenha sempre os hífens (-) separando os campos
- A descrição deve estar entre parênteses
- Para créditos, use apenas: `valor - credito`

Vamos começar a controlar suas finanças! 💰";

pub const INVALID_FORMAT: &str = "❌ Formato inválido! Use:

*Para despesas:*
`valor - meio de pagamento - categoria (descrição) - usuário`
Exemplo: `50.00 - Dinheiro - Transporte (uber) - João`

*Para créditos:*
`valor - credito`
Exemplo: `1500.00 - credito`";

pub const UNKNOWN_COMMAND: &str = "❓ Comando não reconhecido.

Use /start para ver os comandos disponíveis ou envie uma despesa no formato:
`valor - meio de pagamento - categoria (descrição) - usuário`";

pub const TABLE_CLEARED: &str = "✅ Tabela limpa com sucesso! Todos os dados foram removidos.";
pub const CLEAR_FAILED: &str = "❌ Erro ao limpar a tabela. Tente novamente.";

pub const GENERATING: &str = "📊 Gerando estatísticas... Por favor, aguarde.";
pub const NO_DATA: &str =
    "📈 Nenhum dado encontrado para gerar estatísticas. Adicione algumas despesas primeiro!";
pub const REPORT_DONE: &str = "✅ Relatório completo enviado!";
pub const STATISTICS_FAILED: &str = "❌ Erro ao gerar estatísticas. Tente novamente mais tarde.";

pub const EXPENSE_FAILED: &str = "❌ Erro ao registrar despesa. Tente novamente.";
pub const CREDIT_FAILED: &str = "❌ Erro ao registrar crédito. Tente novamente.";

pub fn credit_recorded(amount: Decimal) -> String {
    format!("✅ Crédito registrado com sucesso! ➕\n\n💰 Valor: R$ {amount:.2}")
}

/// Echoes the fields as typed, before normalization.
pub fn expense_recorded(e: &Expense) -> String {
    format!(
        "✅ Despesa registrada com sucesso! ➖\n\n\
         💰 Valor: R$ {:.2}\n\
         💳 Meio: {}\n\
         🏷️ Categoria: {}\n\
         📝 Descrição: {}\n\
         👤 Usuário: {}",
        e.amount, e.payment_method, e.category, e.description, e.payer
    )
}

pub fn recorded(txn: &Transaction) -> String {
    match txn {
        Transaction::Expense(e) => expense_recorded(e),
        Transaction::Credit { amount } => credit_recorded(*amount),
    }
}

pub fn record_failed(txn: &Transaction) -> &'static str {
    match txn {
        Transaction::Expense(_) => EXPENSE_FAILED,
        Transaction::Credit { .. } => CREDIT_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_confirmation() {
        let amount: Decimal = "1500".parse().unwrap();
        assert_eq!(
            credit_recorded(amount),
            "✅ Crédito registrado com sucesso! ➕\n\n💰 Valor: R$ 1500.00"
        );
    }

    #[test]
    fn test_expense_confirmation_keeps_typed_fields() {
        let e = Expense::new(
            "100.5".parse().unwrap(),
            "Cartão Visa",
            "Alimentação",
            "supermercado",
            "Maria",
        );
        let text = expense_recorded(&e);
        assert!(text.contains("💰 Valor: R$ 100.50\n"));
        assert!(text.contains("💳 Meio: Cartão Visa\n"));
        assert!(text.ends_with("👤 Usuário: Maria"));
    }
}
